use crate::connector::adapter::SalesforceAdapter;
use crate::connector::error::ConnectorError;
use crate::connector::ports::SalesforceApi;
use crate::connector::soql;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

const PRODUCT_SOQL: &str =
    "SELECT PricebookEntry.Product2Id FROM OpportunityLineItem where Id = '%s'";

pub struct OpportunityLineItemAdapter<'a> {
    inner: SalesforceAdapter<'a>,
}

impl<'a> OpportunityLineItemAdapter<'a> {
    pub fn new(api: &'a dyn SalesforceApi) -> Self {
        Self {
            inner: SalesforceAdapter::new(api, SalesforceModel::OpportunityLineItem),
        }
    }

    /// Товары строки через её позицию прайс-листа
    pub async fn products(&self, line_id: &str) -> Result<Vec<String>, ConnectorError> {
        let query = soql::format(PRODUCT_SOQL, &[soql::escape(line_id).as_str()]);
        let rows = self.inner.query(&query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                row.get("PricebookEntry")?
                    .get("Product2Id")?
                    .as_str()
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }
}
