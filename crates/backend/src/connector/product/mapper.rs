//! Product2 → `product.product`

use crate::connector::error::ConnectorError;
use crate::connector::mapping::{single, ComputedRule, MapContext, Mapper, MappingRule};
use crate::connector::record::{FieldMap, SalesforceRecord};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Active,
    SaleOk,
    Type,
}

#[derive(Debug, Default)]
pub struct ProductMapper;

#[async_trait]
impl Mapper for ProductMapper {
    type Field = ProductField;

    const DIRECT: &'static [MappingRule] = &[
        MappingRule::new("Name", "name"),
        MappingRule::new("ProductCode", "default_code"),
        MappingRule::new("Description", "description"),
    ];

    const COMPUTED: &'static [ComputedRule<ProductField>] = &[
        ComputedRule::always(ProductField::Active),
        ComputedRule::always(ProductField::SaleOk),
        ComputedRule::on_create(ProductField::Type),
    ];

    async fn compute(
        &self,
        field: ProductField,
        record: &SalesforceRecord,
        _ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        Ok(match field {
            ProductField::Active => single("active", record.is_truthy("IsActive")),
            ProductField::SaleOk => single("sale_ok", true),
            ProductField::Type => single("type", "product"),
        })
    }
}
