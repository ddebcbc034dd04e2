use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, Origin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Идентификатор записи в ERP
pub type RecordId = i64;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesforceBackendId(pub Uuid);

impl SalesforceBackendId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for SalesforceBackendId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SalesforceBackendId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Value objects
// ============================================================================

/// Какая система является мастером для товаров
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProductMaster {
    /// Товары ведутся в Salesforce и подтягиваются по требованию
    #[serde(rename = "sf")]
    #[default]
    Salesforce,
    /// Товары ведутся в ERP
    #[serde(rename = "erp")]
    Erp,
}

/// Соответствие валюты и версии прайс-листа ERP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricelistEntryMapping {
    /// ISO-код валюты (например, "EUR")
    pub currency: String,
    #[serde(rename = "pricelistVersionId")]
    pub pricelist_version_id: RecordId,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Настройки подключения к Salesforce (backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesforceBackend {
    #[serde(flatten)]
    pub base: BaseAggregate<SalesforceBackendId>,

    #[serde(rename = "loginUrl")]
    pub login_url: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "consumerKey", default)]
    pub consumer_key: String,
    /// Секреты принимаются, но наружу не отдаются
    #[serde(rename = "consumerSecret", default, skip_serializing)]
    pub consumer_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(rename = "securityToken", default, skip_serializing)]
    pub security_token: String,

    /// Команда продаж ERP для новых заказов
    #[serde(rename = "salesTeamId")]
    pub sales_team_id: Option<RecordId>,
    #[serde(rename = "productMaster", default)]
    pub product_master: ProductMaster,
    /// Валюта для записей без CurrencyIsoCode (org без мультивалютности)
    #[serde(rename = "defaultCurrency")]
    pub default_currency: String,
    #[serde(rename = "entryMappings", default)]
    pub entry_mappings: Vec<PricelistEntryMapping>,

    /// Конец окна последней успешной пакетной загрузки, по коду модели
    #[serde(rename = "lastSync", default)]
    pub last_sync: BTreeMap<String, DateTime<Utc>>,
}

impl SalesforceBackend {
    pub fn new_for_insert(code: String, description: String, login_url: String) -> Self {
        Self {
            base: BaseAggregate::new(SalesforceBackendId::new_v4(), code, description),
            login_url,
            api_version: "38.0".to_string(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            username: String::new(),
            password: String::new(),
            security_token: String::new(),
            sales_team_id: None,
            product_master: ProductMaster::default(),
            default_currency: "EUR".to_string(),
            entry_mappings: Vec::new(),
            last_sync: BTreeMap::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    /// Версия прайс-листа, настроенная для валюты
    pub fn pricelist_version_for(&self, currency: &str) -> Option<RecordId> {
        self.entry_mappings
            .iter()
            .find(|m| m.currency.eq_ignore_ascii_case(currency))
            .map(|m| m.pricelist_version_id)
    }

    pub fn last_sync_for(&self, model_code: &str) -> Option<DateTime<Utc>> {
        self.last_sync.get(model_code).copied()
    }

    pub fn set_last_sync(&mut self, model_code: &str, at: DateTime<Utc>) {
        self.last_sync.insert(model_code.to_string(), at);
    }

    pub fn update(&mut self, dto: &SalesforceBackendDto) {
        if let Some(code) = &dto.code {
            self.base.code = code.clone();
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.login_url = dto.login_url.clone();
        self.api_version = dto.api_version.clone();
        self.consumer_key = dto.consumer_key.clone();
        self.username = dto.username.clone();
        // Пустой секрет в DTO означает "не менять"
        if !dto.consumer_secret.is_empty() {
            self.consumer_secret = dto.consumer_secret.clone();
        }
        if !dto.password.is_empty() {
            self.password = dto.password.clone();
        }
        if !dto.security_token.is_empty() {
            self.security_token = dto.security_token.clone();
        }
        self.sales_team_id = dto.sales_team_id;
        self.product_master = dto.product_master;
        self.default_currency = dto.default_currency.clone();
        self.entry_mappings = dto.entry_mappings.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Description must not be empty".into());
        }
        if self.login_url.trim().is_empty() {
            return Err("Login URL must not be empty".into());
        }
        if self.api_version.trim().is_empty() {
            return Err("API version must not be empty".into());
        }
        if self.username.trim().is_empty() {
            return Err("Username must not be empty".into());
        }
        if self.default_currency.trim().is_empty() {
            return Err("Default currency must not be empty".into());
        }
        let mut seen: Vec<String> = Vec::new();
        for mapping in &self.entry_mappings {
            let currency = mapping.currency.trim().to_uppercase();
            if currency.is_empty() {
                return Err("Pricelist mapping without currency".into());
            }
            if seen.contains(&currency) {
                return Err(format!(
                    "Currency {} is mapped to more than one pricelist version",
                    currency
                ));
            }
            seen.push(currency);
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for SalesforceBackend {
    type Id = SalesforceBackendId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "salesforce_backend"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

// ============================================================================
// DTO
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesforceBackendDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    #[serde(rename = "loginUrl")]
    pub login_url: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "consumerKey", default)]
    pub consumer_key: String,
    #[serde(rename = "consumerSecret", default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "securityToken", default)]
    pub security_token: String,
    #[serde(rename = "salesTeamId")]
    pub sales_team_id: Option<RecordId>,
    #[serde(rename = "productMaster", default)]
    pub product_master: ProductMaster,
    #[serde(rename = "defaultCurrency")]
    pub default_currency: String,
    #[serde(rename = "entryMappings", default)]
    pub entry_mappings: Vec<PricelistEntryMapping>,
}
