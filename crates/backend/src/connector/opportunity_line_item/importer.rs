use super::mapper::OpportunityLineItemMapper;
use crate::connector::error::ConnectorError;
use crate::connector::record::SalesforceRecord;
use crate::connector::synchronizer::{Dependency, ImportEnv, ImportHooks, Reimport};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// Импорт строки сделки; строки никогда не деактивируются
#[derive(Debug, Default)]
pub struct OpportunityLineItemImporter {
    mapper: OpportunityLineItemMapper,
}

#[async_trait]
impl ImportHooks for OpportunityLineItemImporter {
    type Mapper = OpportunityLineItemMapper;

    const MODEL: SalesforceModel = SalesforceModel::OpportunityLineItem;

    fn mapper(&self) -> &OpportunityLineItemMapper {
        &self.mapper
    }

    async fn to_deactivate(
        &self,
        _salesforce_id: &str,
        _record: &SalesforceRecord,
        _env: &ImportEnv<'_>,
    ) -> Result<bool, ConnectorError> {
        Ok(false)
    }

    async fn deactivate(
        &self,
        _salesforce_id: &str,
        _env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn dependencies(&self, record: &SalesforceRecord) -> Vec<Dependency> {
        record
            .str_field("Product2Id")
            .map(|product_id| {
                Dependency::new(
                    SalesforceModel::Product,
                    product_id,
                    Reimport::WhenUnboundAndSalesforceMaster,
                )
            })
            .into_iter()
            .collect()
    }
}
