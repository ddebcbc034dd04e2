//! OpportunityLineItem → `sale.order.line`

use super::adapter::OpportunityLineItemAdapter;
use crate::connector::error::ConnectorError;
use crate::connector::mapping::{
    merge_missing, single, ComputedRule, MapContext, Mapper, MappingRule,
};
use crate::connector::ports::ProductChange;
use crate::connector::record::{is_truthy, many2one_id, FieldMap, SalesforceRecord};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;
use serde_json::Value;

pub const ORDER_MODEL: &str = "sale.order";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    Name,
    Product,
    PriceAndQuantity,
    Order,
}

#[derive(Debug, Default)]
pub struct OpportunityLineItemMapper;

fn describe(record: &SalesforceRecord) -> &str {
    record.id().unwrap_or_default()
}

impl OpportunityLineItemMapper {
    async fn product_id(
        &self,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let line_id = record.id().unwrap_or_default();
        let products = OpportunityLineItemAdapter::new(ctx.api)
            .products(line_id)
            .await?;
        let Some(product_sf_id) = products.first() else {
            return Ok(single("product_id", false));
        };
        let product_id = ctx
            .binder
            .to_erp_id(SalesforceModel::Product, product_sf_id)
            .await?
            .ok_or_else(|| {
                ConnectorError::mapping(format!(
                    "Product is not available in ERP for record {}",
                    describe(record)
                ))
            })?;
        Ok(single("product_id", product_id))
    }

    /// ListPrice обязателен; пустое или нулевое количество считается за 1
    fn price_and_quantity(&self, record: &SalesforceRecord) -> Result<FieldMap, ConnectorError> {
        let price = record
            .get("ListPrice")
            .filter(|value| is_truthy(value))
            .cloned()
            .ok_or_else(|| {
                ConnectorError::mapping(format!(
                    "No ListPrice given for Opportunity Item {}",
                    describe(record)
                ))
            })?;
        let quantity = record
            .number("Quantity")
            .filter(|quantity| *quantity != 0.0)
            .unwrap_or(1.0);

        let mut values = FieldMap::new();
        values.insert("price_unit".into(), price);
        values.insert("product_uom_qty".into(), Value::from(quantity));
        Ok(values)
    }

    async fn order_id(
        &self,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let opportunity_sf_id = record.str_field("OpportunityId").ok_or_else(|| {
            ConnectorError::mapping(format!("No OpportunityId for record {}", describe(record)))
        })?;
        let order_id = ctx
            .binder
            .to_erp_id(SalesforceModel::Opportunity, opportunity_sf_id)
            .await?
            .ok_or_else(|| {
                ConnectorError::mapping(format!("No Opportunity for item {}", describe(record)))
            })?;
        Ok(single("order_id", order_id))
    }
}

#[async_trait]
impl Mapper for OpportunityLineItemMapper {
    type Field = LineItemField;

    const DIRECT: &'static [MappingRule] = &[MappingRule::new("Discount", "discount")];

    const COMPUTED: &'static [ComputedRule<LineItemField>] = &[
        ComputedRule::always(LineItemField::Name),
        ComputedRule::always(LineItemField::Product),
        ComputedRule::always(LineItemField::PriceAndQuantity),
        ComputedRule::always(LineItemField::Order),
    ];

    async fn compute(
        &self,
        field: LineItemField,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        match field {
            // Описание в Salesforce ограничено 255 символами
            LineItemField::Name => Ok(record
                .str_field("Description")
                .map(|name| single("name", name))
                .unwrap_or_default()),
            LineItemField::Product => self.product_id(record, ctx).await,
            LineItemField::PriceAndQuantity => self.price_and_quantity(record),
            LineItemField::Order => self.order_id(record, ctx).await,
        }
    }

    /// Правила ERP при смене товара строки
    async fn finalize(
        &self,
        mut values: FieldMap,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let order_id = values
            .get("order_id")
            .and_then(many2one_id)
            .ok_or_else(|| ConnectorError::mapping("Sale order line has no order"))?;
        let order = ctx
            .store
            .browse(ORDER_MODEL, order_id)
            .await?
            .ok_or_else(|| {
                ConnectorError::mapping(format!("Sale order {} does not exist", order_id))
            })?;
        let order_ref = |field: &str| order.get(field).and_then(many2one_id);

        let change = ProductChange {
            pricelist_id: order_ref("pricelist_id"),
            product_id: values.get("product_id").and_then(many2one_id),
            partner_id: order_ref("partner_id"),
            quantity: values
                .get("product_uom_qty")
                .and_then(Value::as_f64)
                .unwrap_or(1.0),
            date_order: order
                .get("date_order")
                .and_then(Value::as_str)
                .map(str::to_string),
            fiscal_position_id: order_ref("fiscal_position"),
        };
        let changed = ctx.store.sale_order_line_product_change(&change).await?;
        merge_missing(&mut values, changed);
        Ok(values)
    }
}
