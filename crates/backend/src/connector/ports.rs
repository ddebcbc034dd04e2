//! Внешние сервисы, с которыми работает коннектор

use super::error::ConnectorError;
use super::record::{FieldMap, RecordId, SalesforceRecord};
use super::synchronizer::ImportOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};
use serde_json::Value;
use uuid::Uuid;

/// REST API Salesforce
#[async_trait]
pub trait SalesforceApi: Send + Sync {
    /// Выполнить SOQL-запрос и вернуть все записи (со всех страниц)
    async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, ConnectorError>;

    /// Прочитать одну запись sObject по Id
    async fn read(&self, sobject: &str, id: &str) -> Result<SalesforceRecord, ConnectorError>;

    /// Id записей sObject, изменённых в окне `[start, end]`
    async fn get_updated(
        &self,
        sobject: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError>;
}

/// Условие поиска в ERP: `(field, operator, value)`
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: String,
    pub operator: &'static str,
    pub value: Value,
}

impl Criterion {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: "=",
            value: value.into(),
        }
    }

    /// Сравнение строк без учёта регистра
    pub fn ilike(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: "=ilike",
            value: Value::from(value),
        }
    }

    /// Кортеж домена ERP
    pub fn to_domain(&self) -> Value {
        Value::Array(vec![
            Value::from(self.field.clone()),
            Value::from(self.operator),
            self.value.clone(),
        ])
    }
}

/// Аргументы правила "сменился товар" строки заказа
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChange {
    pub pricelist_id: Option<RecordId>,
    pub product_id: Option<RecordId>,
    pub partner_id: Option<RecordId>,
    pub quantity: f64,
    pub date_order: Option<String>,
    pub fiscal_position_id: Option<RecordId>,
}

/// Хранилище ERP и его бизнес-правила
#[async_trait]
pub trait ErpStore: Send + Sync {
    async fn create(&self, model: &str, values: &FieldMap) -> Result<RecordId, ConnectorError>;

    async fn write(
        &self,
        model: &str,
        ids: &[RecordId],
        values: &FieldMap,
    ) -> Result<(), ConnectorError>;

    async fn unlink(&self, model: &str, ids: &[RecordId]) -> Result<(), ConnectorError>;

    async fn browse(&self, model: &str, id: RecordId) -> Result<Option<FieldMap>, ConnectorError>;

    async fn search(
        &self,
        model: &str,
        criteria: &[Criterion],
    ) -> Result<Vec<RecordId>, ConnectorError>;

    /// Значения, которые ERP проставляет заказу при смене контрагента
    async fn sale_order_onchange_partner(
        &self,
        partner_id: RecordId,
    ) -> Result<FieldMap, ConnectorError>;

    /// Значения, которые ERP проставляет строке заказа при смене товара
    async fn sale_order_line_product_change(
        &self,
        change: &ProductChange,
    ) -> Result<FieldMap, ConnectorError>;
}

/// Таблица привязок Salesforce Id → запись ERP (в рамках одного backend)
#[async_trait]
pub trait Binder: Send + Sync {
    /// Привязка целиком (`unwrap = false`)
    async fn to_binding(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<Option<Binding>, ConnectorError>;

    /// Только id записи ERP (`unwrap = true`)
    async fn to_erp_id(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<Option<RecordId>, ConnectorError> {
        Ok(self
            .to_binding(model, salesforce_id)
            .await?
            .map(|binding| binding.erp_id))
    }

    /// Создать привязку или обновить дату синхронизации существующей
    async fn bind(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
        erp_id: RecordId,
    ) -> Result<Binding, ConnectorError>;

    async fn set_shipping_partner(
        &self,
        binding_id: Uuid,
        partner_id: Option<RecordId>,
    ) -> Result<(), ConnectorError>;

    async fn unbind(&self, binding_id: Uuid) -> Result<(), ConnectorError>;
}

/// Вложенный импорт связанной записи в рамках текущей единицы работы
#[async_trait]
pub trait ImportTrigger: Send + Sync {
    async fn import_record(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<ImportOutcome, ConnectorError>;
}
