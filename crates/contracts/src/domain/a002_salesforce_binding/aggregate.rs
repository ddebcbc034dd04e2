use crate::domain::a001_salesforce_backend::aggregate::{RecordId, SalesforceBackendId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Синхронизируемые модели Salesforce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesforceModel {
    Account,
    Opportunity,
    OpportunityLineItem,
    PricebookEntry,
    Product,
}

impl SalesforceModel {
    pub const ALL: [SalesforceModel; 5] = [
        SalesforceModel::Account,
        SalesforceModel::Product,
        SalesforceModel::PricebookEntry,
        SalesforceModel::Opportunity,
        SalesforceModel::OpportunityLineItem,
    ];

    /// Короткий код модели (используется в API и в last_sync)
    pub fn code(&self) -> &'static str {
        match self {
            SalesforceModel::Account => "account",
            SalesforceModel::Opportunity => "opportunity",
            SalesforceModel::OpportunityLineItem => "opportunity_line_item",
            SalesforceModel::PricebookEntry => "pricebook_entry",
            SalesforceModel::Product => "product",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    /// Имя sObject в Salesforce
    pub fn sobject(&self) -> &'static str {
        match self {
            SalesforceModel::Account => "Account",
            SalesforceModel::Opportunity => "Opportunity",
            SalesforceModel::OpportunityLineItem => "OpportunityLineItem",
            SalesforceModel::PricebookEntry => "PricebookEntry",
            SalesforceModel::Product => "Product2",
        }
    }

    /// Имя модели привязки
    pub fn binding_model(&self) -> &'static str {
        match self {
            SalesforceModel::Account => "connector.salesforce.account",
            SalesforceModel::Opportunity => "connector.salesforce.opportunity",
            SalesforceModel::OpportunityLineItem => "connector.salesforce.opportunity.line.item",
            SalesforceModel::PricebookEntry => "connector.salesforce.pricebook.entry",
            SalesforceModel::Product => "connector.salesforce.product",
        }
    }

    /// Модель ERP, в которую пишутся данные
    pub fn erp_model(&self) -> &'static str {
        match self {
            SalesforceModel::Account => "res.partner",
            SalesforceModel::Opportunity => "sale.order",
            SalesforceModel::OpportunityLineItem => "sale.order.line",
            SalesforceModel::PricebookEntry => "product.pricelist.item",
            SalesforceModel::Product => "product.product",
        }
    }
}

impl std::fmt::Display for SalesforceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.binding_model())
    }
}

/// Привязка записи Salesforce к записи ERP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub id: Uuid,
    #[serde(rename = "backendId")]
    pub backend_id: SalesforceBackendId,
    pub model: SalesforceModel,
    #[serde(rename = "salesforceId")]
    pub salesforce_id: String,
    #[serde(rename = "erpId")]
    pub erp_id: RecordId,
    /// Адрес доставки (только для Account)
    #[serde(rename = "shippingPartnerId")]
    pub shipping_partner_id: Option<RecordId>,
    #[serde(rename = "syncDate")]
    pub sync_date: DateTime<Utc>,
}

impl Binding {
    pub fn new(
        backend_id: SalesforceBackendId,
        model: SalesforceModel,
        salesforce_id: String,
        erp_id: RecordId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend_id,
            model,
            salesforce_id,
            erp_id,
            shipping_partner_id: None,
            sync_date: Utc::now(),
        }
    }
}
