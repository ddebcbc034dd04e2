use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Текущий прогресс импорта из Salesforce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportProgress {
    pub session_id: String,
    pub status: ImportStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,

    /// Прогресс по каждой модели
    pub models: Vec<ModelProgress>,

    pub total_processed: i32,
    pub total_inserted: i32,
    pub total_updated: i32,
    pub total_skipped: i32,
    pub total_errors: i32,

    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProgress {
    pub model: String,
    pub status: ModelImportStatus,
    pub processed: i32,
    pub total: Option<i32>,
    pub inserted: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: i32,
    /// Текущая обрабатываемая запись (Salesforce Id)
    pub current_item: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelImportStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportError {
    pub model: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ImportProgress {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            status: ImportStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            updated_at: Utc::now(),
            models: Vec::new(),
            total_processed: 0,
            total_inserted: 0,
            total_updated: 0,
            total_skipped: 0,
            total_errors: 0,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, model: Option<String>, message: String, details: Option<String>) {
        self.errors.push(ImportError {
            model,
            message,
            details,
            timestamp: Utc::now(),
        });
        self.total_errors += 1;
    }

    /// Пересчитать итоги по моделям
    pub fn recompute_totals(&mut self) {
        self.total_processed = self.models.iter().map(|m| m.processed).sum();
        self.total_inserted = self.models.iter().map(|m| m.inserted).sum();
        self.total_updated = self.models.iter().map(|m| m.updated).sum();
        self.total_skipped = self.models.iter().map(|m| m.skipped).sum();
    }
}
