use super::mapper::AccountMapper;
use crate::connector::error::ConnectorError;
use crate::connector::record::SalesforceRecord;
use crate::connector::synchronizer::{ImportEnv, ImportHooks};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};

/// Импорт Account: контрагент-компания и его адрес доставки
#[derive(Debug, Default)]
pub struct AccountImporter {
    mapper: AccountMapper,
}

#[async_trait]
impl ImportHooks for AccountImporter {
    type Mapper = AccountMapper;

    const MODEL: SalesforceModel = SalesforceModel::Account;

    fn mapper(&self) -> &AccountMapper {
        &self.mapper
    }

    async fn after_import(
        &self,
        binding: &Binding,
        record: &SalesforceRecord,
        env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        let shipping_partner_id = self
            .mapper
            .map_shipping_address(record, Some(binding), &env.map_context(false))
            .await?;
        env.binder
            .set_shipping_partner(binding.id, shipping_partner_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::synchronizer::{run, ImportOutcome};
    use crate::connector::testing::{backend, ErpCall, Fixture};
    use serde_json::json;

    fn seed_account(fixture: &Fixture, shipping_city: Option<&str>) {
        fixture.salesforce.add_record(
            "Account",
            json!({
                "Id": "001A",
                "Name": "Camptocamp",
                "BillingCity": "Lausanne",
                "BillingCountryCode": "CH",
                "IsDeleted": false,
                "ShippingCity": shipping_city
            }),
        );
    }

    #[tokio::test]
    async fn test_import_creates_partner_binding_and_shipping_address() {
        let fixture = Fixture::new(backend());
        seed_account(&fixture, Some("Geneva"));

        let outcome = run(&AccountImporter::default(), "001A", &fixture.env())
            .await
            .unwrap();

        let ImportOutcome::Imported { binding, created } = outcome else {
            panic!("expected an import, got {:?}", outcome);
        };
        assert!(created);
        let partner = fixture.erp.get("res.partner", binding.erp_id).unwrap();
        assert_eq!(partner["name"], json!("Camptocamp"));
        assert_eq!(partner["is_company"], json!(true));

        let stored = fixture.binder.find(SalesforceModel::Account, "001A").unwrap();
        let shipping_id = stored.shipping_partner_id.unwrap();
        let shipping = fixture.erp.get("res.partner", shipping_id).unwrap();
        assert_eq!(shipping["city"], json!("Geneva"));
        assert_eq!(shipping["parent_id"], json!(binding.erp_id));
    }

    #[tokio::test]
    async fn test_reimport_updates_partner_and_reuses_shipping_address() {
        let fixture = Fixture::new(backend());
        seed_account(&fixture, Some("Geneva"));
        let importer = AccountImporter::default();
        run(&importer, "001A", &fixture.env()).await.unwrap();
        let first = fixture.binder.find(SalesforceModel::Account, "001A").unwrap();

        seed_account(&fixture, Some("Zurich"));
        let outcome = run(&importer, "001A", &fixture.env()).await.unwrap();

        assert!(matches!(outcome, ImportOutcome::Imported { created: false, .. }));
        let second = fixture.binder.find(SalesforceModel::Account, "001A").unwrap();
        assert_eq!(second.erp_id, first.erp_id);
        assert_eq!(second.shipping_partner_id, first.shipping_partner_id);
        let shipping = fixture
            .erp
            .get("res.partner", second.shipping_partner_id.unwrap())
            .unwrap();
        assert_eq!(shipping["city"], json!("Zurich"));
        let creates = fixture
            .erp
            .calls()
            .into_iter()
            .filter(|call| matches!(call, ErpCall::Create { .. }))
            .count();
        assert_eq!(creates, 2);
    }

    #[tokio::test]
    async fn test_deleted_account_deactivates_partner() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Account, "001D", 600);
        fixture.salesforce.add_record(
            "Account",
            json!({"Id": "001D", "Name": "Gone", "IsDeleted": true}),
        );

        let outcome = run(&AccountImporter::default(), "001D", &fixture.env())
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Deactivated);
        assert_eq!(fixture.erp.get("res.partner", 600).unwrap()["active"], json!(false));
    }

    #[tokio::test]
    async fn test_mapping_error_writes_nothing() {
        let fixture = Fixture::new(backend());
        fixture.salesforce.add_record(
            "Account",
            json!({"Id": "001E", "Name": "Yen Corp", "CurrencyIsoCode": "JPY"}),
        );

        let err = run(&AccountImporter::default(), "001E", &fixture.env())
            .await
            .unwrap_err();

        assert!(err.is_mapping());
        assert!(fixture.erp.calls().is_empty());
        assert!(fixture.binder.find(SalesforceModel::Account, "001E").is_none());
    }
}
