use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Запрос на пакетный импорт из Salesforce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// ID настроек подключения (a001_salesforce_backend)
    pub backend_id: String,

    /// Коды моделей для импорта (например, ["account", "opportunity"])
    pub target_models: Vec<String>,

    /// Начало окна изменений; по умолчанию: конец прошлой загрузки
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,

    /// Конец окна изменений; по умолчанию: текущий момент
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
}

/// Запрос на импорт одной записи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecordRequest {
    pub backend_id: String,
    pub model: String,
    pub salesforce_id: String,
}
