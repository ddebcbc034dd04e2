//! Точка входа коннектора для одного backend

use super::account::importer::AccountImporter;
use super::adapter::SalesforceAdapter;
use super::error::ConnectorError;
use super::opportunity::adapter::OpportunityAdapter;
use super::opportunity::importer::OpportunityImporter;
use super::opportunity_line_item::importer::OpportunityLineItemImporter;
use super::pricebook_entry::importer::PricebookEntryImporter;
use super::ports::{Binder, ErpStore, ImportTrigger, SalesforceApi};
use super::product::importer::ProductImporter;
use super::synchronizer::{run, ImportEnv, ImportOutcome};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::SalesforceBackend;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;
use std::sync::Arc;

/// Настройки backend и внешние сервисы, с которыми он работает
pub struct Connector {
    backend: SalesforceBackend,
    api: Arc<dyn SalesforceApi>,
    store: Arc<dyn ErpStore>,
    binder: Arc<dyn Binder>,
    /// Фиксированная дата для тестов; иначе текущая
    today: Option<NaiveDate>,
}

impl Connector {
    pub fn new(
        backend: SalesforceBackend,
        api: Arc<dyn SalesforceApi>,
        store: Arc<dyn ErpStore>,
        binder: Arc<dyn Binder>,
    ) -> Self {
        Self {
            backend,
            api,
            store,
            binder,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn backend(&self) -> &SalesforceBackend {
        &self.backend
    }

    pub fn env(&self) -> ImportEnv<'_> {
        ImportEnv {
            backend: &self.backend,
            api: self.api.as_ref(),
            store: self.store.as_ref(),
            binder: self.binder.as_ref(),
            trigger: self,
            today: self.today.unwrap_or_else(|| Utc::now().date_naive()),
        }
    }

    /// Id записей, изменённых в окне; для сделок только выигранные
    pub async fn list_updated(
        &self,
        model: SalesforceModel,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError> {
        match model {
            SalesforceModel::Opportunity => {
                OpportunityAdapter::new(self.api.as_ref())
                    .get_updated(start, end)
                    .await
            }
            _ => {
                SalesforceAdapter::new(self.api.as_ref(), model)
                    .get_updated(start, end)
                    .await
            }
        }
    }
}

#[async_trait]
impl ImportTrigger for Connector {
    async fn import_record(
        &self,
        model: SalesforceModel,
        salesforce_id: &str,
    ) -> Result<ImportOutcome, ConnectorError> {
        let env = self.env();
        tracing::debug!(
            "Import {} {} for backend {}",
            model,
            salesforce_id,
            self.backend.name()
        );
        match model {
            SalesforceModel::Account => run(&AccountImporter::default(), salesforce_id, &env).await,
            SalesforceModel::Opportunity => {
                run(&OpportunityImporter::default(), salesforce_id, &env).await
            }
            SalesforceModel::OpportunityLineItem => {
                run(&OpportunityLineItemImporter::default(), salesforce_id, &env).await
            }
            SalesforceModel::PricebookEntry => {
                run(&PricebookEntryImporter::default(), salesforce_id, &env).await
            }
            SalesforceModel::Product => run(&ProductImporter::default(), salesforce_id, &env).await,
        }
    }
}
