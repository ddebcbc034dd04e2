use super::mapper::ProductMapper;
use crate::connector::synchronizer::ImportHooks;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// Импорт товара; вызывается по требованию из строк заказа и прайс-листа
#[derive(Debug, Default)]
pub struct ProductImporter {
    mapper: ProductMapper,
}

impl ImportHooks for ProductImporter {
    type Mapper = ProductMapper;

    const MODEL: SalesforceModel = SalesforceModel::Product;

    fn mapper(&self) -> &ProductMapper {
        &self.mapper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::synchronizer::{run, ImportOutcome};
    use crate::connector::testing::{backend, Fixture};
    use serde_json::json;

    #[tokio::test]
    async fn test_deleted_product_is_deactivated() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Product, "01tX", 900);
        fixture.salesforce.add_record(
            "Product2",
            json!({"Id": "01tX", "Name": "Old", "IsDeleted": true}),
        );

        let outcome = run(&ProductImporter::default(), "01tX", &fixture.env())
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Deactivated);
        assert_eq!(
            fixture.erp.get("product.product", 900).unwrap()["active"],
            json!(false)
        );
    }

    #[tokio::test]
    async fn test_deleted_unbound_product_is_left_alone() {
        let fixture = Fixture::new(backend());
        fixture.salesforce.add_record(
            "Product2",
            json!({"Id": "01tY", "Name": "Never seen", "IsDeleted": true}),
        );

        let outcome = run(&ProductImporter::default(), "01tY", &fixture.env())
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Deactivated);
        assert!(fixture.erp.calls().is_empty());
    }
}
