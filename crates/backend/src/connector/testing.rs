//! Заглушки портов для тестов коннектора

use super::dispatcher::Connector;
use super::error::ConnectorError;
use super::ports::{Binder, Criterion, ErpStore, ImportTrigger, ProductChange, SalesforceApi};
use super::record::{many2one_id, FieldMap, RecordId, SalesforceRecord};
use super::synchronizer::ImportEnv;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::{
    PricelistEntryMapping, SalesforceBackend, SalesforceBackendId,
};
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const EUR_VERSION_ID: RecordId = 7;
pub const EUR_PRICELIST_ID: RecordId = 70;
pub const USD_VERSION_ID: RecordId = 8;
pub const SALES_TEAM_ID: RecordId = 3;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 3, 12).unwrap()
}

/// Backend с версиями прайс-листа для EUR и USD
pub fn backend() -> SalesforceBackend {
    let mut backend = SalesforceBackend::new_for_insert(
        "SF-TEST".to_string(),
        "Salesforce test".to_string(),
        "https://login.salesforce.com".to_string(),
    );
    backend.default_currency = "EUR".to_string();
    backend.sales_team_id = Some(SALES_TEAM_ID);
    backend.entry_mappings = vec![
        PricelistEntryMapping {
            currency: "EUR".to_string(),
            pricelist_version_id: EUR_VERSION_ID,
        },
        PricelistEntryMapping {
            currency: "USD".to_string(),
            pricelist_version_id: USD_VERSION_ID,
        },
    ];
    backend
}

pub fn record(value: Value) -> SalesforceRecord {
    SalesforceRecord::from_value(value).unwrap()
}

// ============================================================================
// Salesforce
// ============================================================================

#[derive(Default)]
pub struct FakeSalesforce {
    records: Mutex<HashMap<(String, String), SalesforceRecord>>,
    queries: Mutex<HashMap<String, Vec<SalesforceRecord>>>,
    updated: Mutex<HashMap<String, Vec<String>>>,
    executed: Mutex<Vec<String>>,
}

impl FakeSalesforce {
    /// Запись sObject; Id берётся из поля `Id`
    pub fn add_record(&self, sobject: &str, value: Value) {
        let rec = record(value);
        let id = rec.id().unwrap().to_string();
        self.records
            .lock()
            .unwrap()
            .insert((sobject.to_string(), id), rec);
    }

    /// Ответ на точный текст SOQL
    pub fn add_query(&self, soql: &str, rows: Vec<Value>) {
        self.queries
            .lock()
            .unwrap()
            .insert(soql.to_string(), rows.into_iter().map(record).collect());
    }

    pub fn set_updated(&self, sobject: &str, ids: &[&str]) {
        self.updated.lock().unwrap().insert(
            sobject.to_string(),
            ids.iter().map(|id| id.to_string()).collect(),
        );
    }

    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SalesforceApi for FakeSalesforce {
    async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, ConnectorError> {
        self.executed.lock().unwrap().push(soql.to_string());
        Ok(self
            .queries
            .lock()
            .unwrap()
            .get(soql)
            .cloned()
            .unwrap_or_default())
    }

    async fn read(&self, sobject: &str, id: &str) -> Result<SalesforceRecord, ConnectorError> {
        self.records
            .lock()
            .unwrap()
            .get(&(sobject.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| ConnectorError::Api(format!("{} {} not found", sobject, id)))
    }

    async fn get_updated(
        &self,
        sobject: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError> {
        Ok(self
            .updated
            .lock()
            .unwrap()
            .get(sobject)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// ERP
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ErpCall {
    Create { model: String, id: RecordId },
    Write { model: String, ids: Vec<RecordId> },
    Unlink { model: String, ids: Vec<RecordId> },
}

pub struct MemoryErp {
    records: Mutex<BTreeMap<(String, RecordId), FieldMap>>,
    next_id: AtomicI64,
    calls: Mutex<Vec<ErpCall>>,
    onchange_partner: Mutex<FieldMap>,
    product_change: Mutex<FieldMap>,
    product_changes: Mutex<Vec<ProductChange>>,
}

impl Default for MemoryErp {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1000),
            calls: Mutex::new(Vec::new()),
            onchange_partner: Mutex::new(FieldMap::new()),
            product_change: Mutex::new(FieldMap::new()),
            product_changes: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryErp {
    pub fn insert(&self, model: &str, id: RecordId, value: Value) {
        let values: FieldMap = match value {
            Value::Object(fields) => fields.into_iter().collect(),
            _ => FieldMap::new(),
        };
        self.records
            .lock()
            .unwrap()
            .insert((model.to_string(), id), values);
    }

    pub fn get(&self, model: &str, id: RecordId) -> Option<FieldMap> {
        self.records
            .lock()
            .unwrap()
            .get(&(model.to_string(), id))
            .cloned()
    }

    pub fn all(&self, model: &str) -> Vec<(RecordId, FieldMap)> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|((m, _), _)| m == model)
            .map(|((_, id), values)| (*id, values.clone()))
            .collect()
    }

    pub fn calls(&self) -> Vec<ErpCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_onchange_partner(&self, values: Value) {
        if let Value::Object(fields) = values {
            *self.onchange_partner.lock().unwrap() = fields.into_iter().collect();
        }
    }

    pub fn set_product_change(&self, values: Value) {
        if let Value::Object(fields) = values {
            *self.product_change.lock().unwrap() = fields.into_iter().collect();
        }
    }

    pub fn product_changes(&self) -> Vec<ProductChange> {
        self.product_changes.lock().unwrap().clone()
    }

    /// Стандартные справочники: страны, регионы, версия прайс-листа EUR
    pub fn with_reference_data(self) -> Self {
        self.insert("res.country", 1, serde_json::json!({"code": "CH", "name": "Switzerland"}));
        self.insert("res.country", 2, serde_json::json!({"code": "US", "name": "United States"}));
        self.insert(
            "res.country.state",
            21,
            serde_json::json!({"code": "VD", "name": "Vaud", "country_id": [1, "Switzerland"]}),
        );
        self.insert(
            "res.country.state",
            22,
            serde_json::json!({"code": "CA", "name": "California", "country_id": [2, "United States"]}),
        );
        self.insert(
            "product.pricelist.version",
            EUR_VERSION_ID,
            serde_json::json!({"name": "EUR 2014", "pricelist_id": [EUR_PRICELIST_ID, "Public EUR"]}),
        );
        self
    }
}

fn matches(values: &FieldMap, criterion: &Criterion) -> bool {
    let Some(actual) = values.get(&criterion.field) else {
        return false;
    };
    match criterion.operator {
        "=ilike" => match (actual.as_str(), criterion.value.as_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        },
        _ => {
            actual == &criterion.value
                || (many2one_id(actual).is_some() && many2one_id(actual) == criterion.value.as_i64())
        }
    }
}

#[async_trait]
impl ErpStore for MemoryErp {
    async fn create(&self, model: &str, values: &FieldMap) -> Result<RecordId, ConnectorError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert((model.to_string(), id), values.clone());
        self.calls.lock().unwrap().push(ErpCall::Create {
            model: model.to_string(),
            id,
        });
        Ok(id)
    }

    async fn write(
        &self,
        model: &str,
        ids: &[RecordId],
        values: &FieldMap,
    ) -> Result<(), ConnectorError> {
        let mut records = self.records.lock().unwrap();
        for id in ids {
            let current = records
                .get_mut(&(model.to_string(), *id))
                .ok_or_else(|| ConnectorError::Erp(format!("{} {} does not exist", model, id)))?;
            current.extend(values.clone());
        }
        self.calls.lock().unwrap().push(ErpCall::Write {
            model: model.to_string(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    async fn unlink(&self, model: &str, ids: &[RecordId]) -> Result<(), ConnectorError> {
        let mut records = self.records.lock().unwrap();
        for id in ids {
            records.remove(&(model.to_string(), *id));
        }
        self.calls.lock().unwrap().push(ErpCall::Unlink {
            model: model.to_string(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    async fn browse(&self, model: &str, id: RecordId) -> Result<Option<FieldMap>, ConnectorError> {
        Ok(self.get(model, id))
    }

    async fn search(
        &self,
        model: &str,
        criteria: &[Criterion],
    ) -> Result<Vec<RecordId>, ConnectorError> {
        Ok(self
            .all(model)
            .into_iter()
            .filter(|(_, values)| criteria.iter().all(|c| matches(values, c)))
            .map(|(id, _)| id)
            .collect())
    }

    async fn sale_order_onchange_partner(
        &self,
        _partner_id: RecordId,
    ) -> Result<FieldMap, ConnectorError> {
        Ok(self.onchange_partner.lock().unwrap().clone())
    }

    async fn sale_order_line_product_change(
        &self,
        change: &ProductChange,
    ) -> Result<FieldMap, ConnectorError> {
        self.product_changes.lock().unwrap().push(change.clone());
        Ok(self.product_change.lock().unwrap().clone())
    }
}

// ============================================================================
// Привязки
// ============================================================================

pub struct MemoryBinder {
    backend_id: SalesforceBackendId,
    bindings: Mutex<Vec<Binding>>,
}

impl MemoryBinder {
    pub fn new(backend_id: SalesforceBackendId) -> Self {
        Self {
            backend_id,
            bindings: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, model: SalesforceModel, salesforce_id: &str, erp_id: RecordId) -> Binding {
        let binding = Binding::new(self.backend_id, model, salesforce_id.to_string(), erp_id);
        self.bindings.lock().unwrap().push(binding.clone());
        binding
    }

    pub fn find(&self, model: SalesforceModel, salesforce_id: &str) -> Option<Binding> {
        self.bindings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.model == model && b.salesforce_id == salesforce_id)
            .cloned()
    }
}

#[async_trait]
impl Binder for MemoryBinder {
    async fn to_binding(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<Option<Binding>, ConnectorError> {
        Ok(self.find(model, salesforce_id))
    }

    async fn bind(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
        erp_id: RecordId,
    ) -> Result<Binding, ConnectorError> {
        let mut bindings = self.bindings.lock().unwrap();
        if let Some(existing) = bindings
            .iter_mut()
            .find(|b| b.model == model && b.salesforce_id == salesforce_id)
        {
            existing.erp_id = erp_id;
            existing.sync_date = Utc::now();
            return Ok(existing.clone());
        }
        let binding = Binding::new(self.backend_id, model, salesforce_id.to_string(), erp_id);
        bindings.push(binding.clone());
        Ok(binding)
    }

    async fn set_shipping_partner(
        &self,
        binding_id: Uuid,
        partner_id: Option<RecordId>,
    ) -> Result<(), ConnectorError> {
        let mut bindings = self.bindings.lock().unwrap();
        let binding = bindings
            .iter_mut()
            .find(|b| b.id == binding_id)
            .ok_or_else(|| ConnectorError::Storage(format!("Binding {} not found", binding_id)))?;
        binding.shipping_partner_id = partner_id;
        Ok(())
    }

    async fn unbind(&self, binding_id: Uuid) -> Result<(), ConnectorError> {
        self.bindings.lock().unwrap().retain(|b| b.id != binding_id);
        Ok(())
    }
}

// ============================================================================
// Сборка
// ============================================================================

pub struct Fixture {
    pub salesforce: Arc<FakeSalesforce>,
    pub erp: Arc<MemoryErp>,
    pub binder: Arc<MemoryBinder>,
    pub connector: Connector,
}

impl Fixture {
    pub fn new(backend: SalesforceBackend) -> Self {
        let salesforce = Arc::new(FakeSalesforce::default());
        let erp = Arc::new(MemoryErp::default().with_reference_data());
        let binder = Arc::new(MemoryBinder::new(backend.base.id));
        let connector = Connector::new(backend, salesforce.clone(), erp.clone(), binder.clone())
            .with_today(today());
        Self {
            salesforce,
            erp,
            binder,
            connector,
        }
    }

    /// Привязка к уже существующей записи ERP
    pub fn bind(&self, model: SalesforceModel, salesforce_id: &str, erp_id: RecordId) -> Binding {
        if self.erp.get(model.erp_model(), erp_id).is_none() {
            self.erp
                .insert(model.erp_model(), erp_id, serde_json::json!({"active": true}));
        }
        self.binder.insert(model, salesforce_id, erp_id)
    }

    pub fn env(&self) -> ImportEnv<'_> {
        self.connector.env()
    }

    pub fn trigger(&self) -> &dyn ImportTrigger {
        &self.connector
    }
}
