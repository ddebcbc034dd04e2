use super::error::ConnectorError;
use super::ports::SalesforceApi;
use super::record::SalesforceRecord;
use chrono::{DateTime, Utc};
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// Доступ к одному sObject через REST API
pub struct SalesforceAdapter<'a> {
    api: &'a dyn SalesforceApi,
    model: SalesforceModel,
}

impl<'a> SalesforceAdapter<'a> {
    pub fn new(api: &'a dyn SalesforceApi, model: SalesforceModel) -> Self {
        Self { api, model }
    }

    pub fn api(&self) -> &'a dyn SalesforceApi {
        self.api
    }

    pub async fn read(&self, salesforce_id: &str) -> Result<SalesforceRecord, ConnectorError> {
        self.api.read(self.model.sobject(), salesforce_id).await
    }

    pub async fn get_updated(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError> {
        self.api.get_updated(self.model.sobject(), start, end).await
    }

    pub async fn query(&self, soql: &str) -> Result<Vec<SalesforceRecord>, ConnectorError> {
        self.api.query(soql).await
    }
}
