use super::adapter::OpportunityAdapter;
use super::mapper::OpportunityMapper;
use crate::connector::error::ConnectorError;
use crate::connector::record::SalesforceRecord;
use crate::connector::synchronizer::{
    discard, Dependency, ImportEnv, ImportHooks, ImportOutcome, Reimport,
};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};

/// Импорт выигранной сделки как заказа
///
/// Заказ импортируется один раз; контрагент перед этим переимпортируется
/// всегда, строки сделки подтягиваются после создания заказа.
#[derive(Debug, Default)]
pub struct OpportunityImporter {
    mapper: OpportunityMapper,
}

#[async_trait]
impl ImportHooks for OpportunityImporter {
    type Mapper = OpportunityMapper;

    const MODEL: SalesforceModel = SalesforceModel::Opportunity;

    fn mapper(&self) -> &OpportunityMapper {
        &self.mapper
    }

    async fn must_skip(
        &self,
        salesforce_id: &str,
        _record: &SalesforceRecord,
        env: &ImportEnv<'_>,
    ) -> Result<Option<String>, ConnectorError> {
        let bound = env
            .binder
            .to_binding(Self::MODEL, salesforce_id)
            .await?
            .is_some();
        Ok(bound.then(|| "Already imported".to_string()))
    }

    async fn deactivate(
        &self,
        _salesforce_id: &str,
        _env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        Err(ConnectorError::NotSupported(
            "Deactivation of sales order is not supported.".to_string(),
        ))
    }

    fn dependencies(&self, record: &SalesforceRecord) -> Vec<Dependency> {
        // Проверка "изменился ли контрагент" стоит больше запросов, чем переимпорт
        record
            .str_field("AccountId")
            .map(|account_id| Dependency::new(SalesforceModel::Account, account_id, Reimport::Always))
            .into_iter()
            .collect()
    }

    async fn after_import(
        &self,
        binding: &Binding,
        _record: &SalesforceRecord,
        env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        let items = OpportunityAdapter::new(env.api)
            .opportunity_item_ids(&binding.salesforce_id)
            .await?;
        tracing::info!(
            "Importing {} line items of opportunity {}",
            items.len(),
            binding.salesforce_id
        );
        let mut created_lines = Vec::new();
        for item_id in items {
            match env
                .trigger
                .import_record(SalesforceModel::OpportunityLineItem, &item_id)
                .await
            {
                Ok(ImportOutcome::Imported {
                    binding,
                    created: true,
                }) => created_lines.push(binding),
                Ok(_) => {}
                Err(e) => {
                    // Строки уходят вместе с заказом, их привязки тоже
                    for line in &created_lines {
                        discard(SalesforceModel::OpportunityLineItem, line, env).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::synchronizer::run;
    use crate::connector::testing::{backend, ErpCall, Fixture};
    use serde_json::json;

    fn seed(fixture: &Fixture) {
        fixture.salesforce.add_record(
            "Opportunity",
            json!({
                "Id": "006A",
                "Name": "Big deal",
                "AccountId": "001A",
                "CurrencyIsoCode": "EUR",
                "IsDeleted": false
            }),
        );
        fixture.salesforce.add_record(
            "Account",
            json!({"Id": "001A", "Name": "Camptocamp", "BillingCountryCode": "CH"}),
        );
        fixture.salesforce.add_record(
            "OpportunityLineItem",
            json!({
                "Id": "00kA",
                "OpportunityId": "006A",
                "ListPrice": 50.0,
                "Quantity": 2,
                "Discount": 10,
                "Description": "Setup"
            }),
        );
        fixture.salesforce.add_query(
            "SELECT Id FROM OpportunityLineItem WHERE OpportunityId = '006A'",
            vec![json!({"Id": "00kA"})],
        );
    }

    #[tokio::test]
    async fn test_import_reimports_account_then_cascades_lines() {
        let fixture = Fixture::new(backend());
        seed(&fixture);
        // Привязка уже есть, но контрагент всё равно переимпортируется
        fixture.bind(SalesforceModel::Account, "001A", 500);

        let outcome = run(&OpportunityImporter::default(), "006A", &fixture.env())
            .await
            .unwrap();

        let ImportOutcome::Imported { binding, created } = outcome else {
            panic!("expected an import, got {:?}", outcome);
        };
        assert!(created);

        let calls = fixture.erp.calls();
        assert_eq!(
            calls[0],
            ErpCall::Write {
                model: "res.partner".to_string(),
                ids: vec![500],
            }
        );
        assert_eq!(
            calls[1],
            ErpCall::Create {
                model: "sale.order".to_string(),
                id: binding.erp_id,
            }
        );

        let line = fixture
            .binder
            .find(SalesforceModel::OpportunityLineItem, "00kA")
            .unwrap();
        let values = fixture.erp.get("sale.order.line", line.erp_id).unwrap();
        assert_eq!(values["order_id"], json!(binding.erp_id));
        assert_eq!(values["name"], json!("Setup"));
    }

    fn line(id: &str, list_price: Option<f64>) -> serde_json::Value {
        json!({
            "Id": id,
            "OpportunityId": "006A",
            "ListPrice": list_price,
            "Quantity": 1,
            "Description": id
        })
    }

    #[tokio::test]
    async fn test_failed_line_leaves_opportunity_unbound_for_retry() {
        let fixture = Fixture::new(backend());
        seed(&fixture);
        fixture
            .salesforce
            .add_record("OpportunityLineItem", line("00kA", None));

        let err = run(&OpportunityImporter::default(), "006A", &fixture.env())
            .await
            .unwrap_err();

        assert!(err.is_mapping());
        assert!(fixture.binder.find(SalesforceModel::Opportunity, "006A").is_none());
        assert!(fixture.erp.all("sale.order").is_empty());

        // После исправления строки повторный запуск импортирует заказ
        fixture
            .salesforce
            .add_record("OpportunityLineItem", line("00kA", Some(50.0)));
        let outcome = run(&OpportunityImporter::default(), "006A", &fixture.env())
            .await
            .unwrap();

        let ImportOutcome::Imported { binding, created } = outcome else {
            panic!("expected an import, got {:?}", outcome);
        };
        assert!(created);
        assert_eq!(fixture.erp.all("sale.order").len(), 1);
        let line = fixture
            .binder
            .find(SalesforceModel::OpportunityLineItem, "00kA")
            .unwrap();
        let values = fixture.erp.get("sale.order.line", line.erp_id).unwrap();
        assert_eq!(values["order_id"], json!(binding.erp_id));
    }

    #[tokio::test]
    async fn test_failed_line_discards_lines_created_before_it() {
        let fixture = Fixture::new(backend());
        seed(&fixture);
        fixture
            .salesforce
            .add_record("OpportunityLineItem", line("00kB", None));
        fixture.salesforce.add_query(
            "SELECT Id FROM OpportunityLineItem WHERE OpportunityId = '006A'",
            vec![json!({"Id": "00kA"}), json!({"Id": "00kB"})],
        );

        run(&OpportunityImporter::default(), "006A", &fixture.env())
            .await
            .unwrap_err();

        assert!(fixture
            .binder
            .find(SalesforceModel::OpportunityLineItem, "00kA")
            .is_none());
        assert!(fixture.erp.all("sale.order.line").is_empty());
        assert!(fixture.binder.find(SalesforceModel::Opportunity, "006A").is_none());
    }

    #[tokio::test]
    async fn test_bound_opportunity_is_skipped() {
        let fixture = Fixture::new(backend());
        seed(&fixture);
        fixture.bind(SalesforceModel::Opportunity, "006A", 800);

        let outcome = run(&OpportunityImporter::default(), "006A", &fixture.env())
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Skipped("Already imported".to_string()));
        assert!(fixture.erp.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_opportunity_is_not_supported() {
        let fixture = Fixture::new(backend());
        fixture.salesforce.add_record(
            "Opportunity",
            json!({"Id": "006D", "Name": "Lost", "AccountId": "001A", "IsDeleted": true}),
        );

        let err = run(&OpportunityImporter::default(), "006D", &fixture.env())
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectorError::NotSupported(_)));
        assert_eq!(
            err.to_string(),
            "Not supported: Deactivation of sales order is not supported."
        );
    }
}
