use crate::connector::adapter::SalesforceAdapter;
use crate::connector::error::ConnectorError;
use crate::connector::ports::SalesforceApi;
use crate::connector::soql;
use chrono::{DateTime, Utc};
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// Сколько Id помещается в один `IN (...)`
pub const MAX_QUERY_OPP: usize = 5000;

const WON_SOQL: &str = "SELECT Id FROM Opportunity WHERE Id IN (%s) AND IsWon = TRUE";
const ITEMS_SOQL: &str = "SELECT Id FROM OpportunityLineItem WHERE OpportunityId = '%s'";

pub struct OpportunityAdapter<'a> {
    inner: SalesforceAdapter<'a>,
}

impl<'a> OpportunityAdapter<'a> {
    pub fn new(api: &'a dyn SalesforceApi) -> Self {
        Self {
            inner: SalesforceAdapter::new(api, SalesforceModel::Opportunity),
        }
    }

    /// Изменённые в окне сделки, только выигранные
    pub async fn get_updated(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>, ConnectorError> {
        let updated = self.inner.get_updated(start, end).await?;
        let mut won = Vec::new();
        for chunk in updated.chunks(MAX_QUERY_OPP) {
            let query = soql::format(WON_SOQL, &[soql::quoted_list(chunk).as_str()]);
            won.extend(
                self.inner
                    .query(&query)
                    .await?
                    .iter()
                    .filter_map(|record| record.id().map(str::to_string)),
            );
        }
        tracing::debug!(
            "{} updated opportunities, {} won",
            updated.len(),
            won.len()
        );
        Ok(won)
    }

    /// Строки сделки
    pub async fn opportunity_item_ids(
        &self,
        opportunity_id: &str,
    ) -> Result<Vec<String>, ConnectorError> {
        let query = soql::format(ITEMS_SOQL, &[soql::escape(opportunity_id).as_str()]);
        Ok(self
            .inner
            .query(&query)
            .await?
            .iter()
            .filter_map(|record| record.id().map(str::to_string))
            .collect())
    }
}
