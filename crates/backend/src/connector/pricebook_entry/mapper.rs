//! PricebookEntry → `product.pricelist.item`

use crate::connector::error::ConnectorError;
use crate::connector::mapping::{single, ComputedRule, MapContext, Mapper, MappingRule};
use crate::connector::pricing::pricelist_version_id;
use crate::connector::record::{FieldMap, SalesforceRecord};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;

/// `base = 1` у позиции прайс-листа означает "публичная цена"
const PUBLIC_PRICE_BASE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricebookEntryField {
    PriceVersion,
    Base,
    Product,
}

#[derive(Debug, Default)]
pub struct PricebookEntryMapper;

#[async_trait]
impl Mapper for PricebookEntryMapper {
    type Field = PricebookEntryField;

    const DIRECT: &'static [MappingRule] = &[MappingRule::new("UnitPrice", "price_surcharge")];

    const COMPUTED: &'static [ComputedRule<PricebookEntryField>] = &[
        ComputedRule::always(PricebookEntryField::PriceVersion),
        ComputedRule::always(PricebookEntryField::Base),
        ComputedRule::always(PricebookEntryField::Product),
    ];

    async fn compute(
        &self,
        field: PricebookEntryField,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        match field {
            PricebookEntryField::PriceVersion => Ok(single(
                "price_version_id",
                pricelist_version_id(ctx, record)?,
            )),
            PricebookEntryField::Base => Ok(single("base", PUBLIC_PRICE_BASE)),
            PricebookEntryField::Product => {
                let no_product = || {
                    ConnectorError::mapping(format!(
                        "No product available for salesforce record {}",
                        record.id().unwrap_or_default()
                    ))
                };
                let product_sf_id = record.str_field("Product2Id").ok_or_else(no_product)?;
                let product_id = ctx
                    .binder
                    .to_erp_id(SalesforceModel::Product, product_sf_id)
                    .await?
                    .ok_or_else(no_product)?;
                Ok(single("product_id", product_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::mapping::map_record;
    use crate::connector::testing::{backend, record, Fixture, EUR_VERSION_ID, USD_VERSION_ID};
    use serde_json::json;

    #[tokio::test]
    async fn test_map_pricebook_entry() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Product, "01tP", 910);
        let env = fixture.env();
        let rec = record(json!({
            "Id": "01uE",
            "UnitPrice": 120.5,
            "Product2Id": "01tP",
            "CurrencyIsoCode": "USD",
            "IsActive": true
        }));

        let values = map_record(&PricebookEntryMapper, &rec, &env.map_context(true))
            .await
            .unwrap();

        assert_eq!(values["price_surcharge"], json!(120.5));
        assert_eq!(values["price_version_id"], json!(USD_VERSION_ID));
        assert_eq!(values["base"], json!(1));
        assert_eq!(values["product_id"], json!(910));
    }

    #[tokio::test]
    async fn test_default_currency_used_without_iso_code() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Product, "01tP", 910);
        let env = fixture.env();
        let rec = record(json!({"Id": "01uE", "UnitPrice": 3, "Product2Id": "01tP"}));

        let values = map_record(&PricebookEntryMapper, &rec, &env.map_context(true))
            .await
            .unwrap();

        assert_eq!(values["price_version_id"], json!(EUR_VERSION_ID));
    }

    #[tokio::test]
    async fn test_unmapped_currency_is_mapping_error() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Product, "01tP", 910);
        let env = fixture.env();
        let rec = record(json!({"Id": "01uE", "Product2Id": "01tP", "CurrencyIsoCode": "CHF"}));

        let err = map_record(&PricebookEntryMapper, &rec, &env.map_context(true))
            .await
            .unwrap_err();

        assert!(err.is_mapping());
        assert!(err
            .to_string()
            .contains("No pricelist version configuration done for currency CHF"));
    }

    #[tokio::test]
    async fn test_unbound_product_is_mapping_error() {
        let fixture = Fixture::new(backend());
        let env = fixture.env();
        for rec in [
            record(json!({"Id": "01uE", "Product2Id": "01tMISSING"})),
            record(json!({"Id": "01uF"})),
        ] {
            let err = map_record(&PricebookEntryMapper, &rec, &env.map_context(true))
                .await
                .unwrap_err();
            assert!(err.is_mapping());
        }
    }
}
