use super::mapper::PricebookEntryMapper;
use crate::connector::error::ConnectorError;
use crate::connector::record::SalesforceRecord;
use crate::connector::synchronizer::{Dependency, ImportEnv, ImportHooks, Reimport};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// Импорт позиции прайс-листа
///
/// Неактивная в Salesforce позиция удаляется из прайс-листа ERP, если она
/// уже была импортирована. Неактивная и ещё не импортированная позиция
/// импортируется как обычно.
#[derive(Debug, Default)]
pub struct PricebookEntryImporter {
    mapper: PricebookEntryMapper,
}

#[async_trait]
impl ImportHooks for PricebookEntryImporter {
    type Mapper = PricebookEntryMapper;

    const MODEL: SalesforceModel = SalesforceModel::PricebookEntry;

    fn mapper(&self) -> &PricebookEntryMapper {
        &self.mapper
    }

    async fn to_deactivate(
        &self,
        salesforce_id: &str,
        record: &SalesforceRecord,
        env: &ImportEnv<'_>,
    ) -> Result<bool, ConnectorError> {
        if record.is_truthy("IsActive") {
            return Ok(false);
        }
        Ok(env
            .binder
            .to_binding(Self::MODEL, salesforce_id)
            .await?
            .is_some())
    }

    async fn deactivate(
        &self,
        salesforce_id: &str,
        env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        if let Some(binding) = env.binder.to_binding(Self::MODEL, salesforce_id).await? {
            env.store
                .unlink(Self::MODEL.erp_model(), &[binding.erp_id])
                .await?;
            env.binder.unbind(binding.id).await?;
        }
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
