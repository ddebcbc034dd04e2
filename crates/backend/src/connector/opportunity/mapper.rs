//! Opportunity → `sale.order`

use crate::connector::error::ConnectorError;
use crate::connector::mapping::{
    merge_missing, single, ComputedRule, MapContext, Mapper, MappingRule,
};
use crate::connector::pricing::pricelist_id;
use crate::connector::record::{many2one_id, relation_value, FieldMap, SalesforceRecord};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpportunityField {
    Pricelist,
    DateOrder,
    Addresses,
    SalesTeam,
}

#[derive(Debug, Default)]
pub struct OpportunityMapper;

impl OpportunityMapper {
    /// Контрагент, счёт и доставка берутся из привязки Account
    async fn addresses(
        &self,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let account_sf_id = record.str_field("AccountId").ok_or_else(|| {
            ConnectorError::mapping(format!(
                "No Account provided in Opportunity {}",
                record.id().unwrap_or_default()
            ))
        })?;
        let account = ctx
            .binder
            .to_binding(SalesforceModel::Account, account_sf_id)
            .await?
            .ok_or_else(|| {
                ConnectorError::mapping(format!("Account {} does not exist", account_sf_id))
            })?;
        let partner_shipping_id = account.shipping_partner_id.unwrap_or(account.erp_id);

        let mut values = FieldMap::new();
        values.insert("partner_id".into(), Value::from(account.erp_id));
        values.insert("partner_invoice_id".into(), Value::from(account.erp_id));
        values.insert("partner_shipping_id".into(), Value::from(partner_shipping_id));
        Ok(values)
    }
}

#[async_trait]
impl Mapper for OpportunityMapper {
    type Field = OpportunityField;

    const DIRECT: &'static [MappingRule] = &[MappingRule::new("Name", "origin")];

    const COMPUTED: &'static [ComputedRule<OpportunityField>] = &[
        ComputedRule::always(OpportunityField::Pricelist),
        ComputedRule::on_create(OpportunityField::DateOrder),
        ComputedRule::always(OpportunityField::Addresses),
        ComputedRule::on_create(OpportunityField::SalesTeam),
    ];

    async fn compute(
        &self,
        field: OpportunityField,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        match field {
            OpportunityField::Pricelist => {
                Ok(single("pricelist_id", pricelist_id(ctx, record).await?))
            }
            OpportunityField::DateOrder => Ok(single(
                "date_order",
                ctx.today.format("%Y-%m-%d").to_string(),
            )),
            OpportunityField::Addresses => self.addresses(record, ctx).await,
            OpportunityField::SalesTeam => Ok(single(
                "section_id",
                relation_value(ctx.backend.sales_team_id),
            )),
        }
    }

    /// Правила ERP при смене контрагента заказа
    async fn finalize(
        &self,
        mut values: FieldMap,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let partner_id = values
            .get("partner_id")
            .and_then(many2one_id)
            .ok_or_else(|| ConnectorError::mapping("Sale order has no partner"))?;
        let changed = ctx.store.sale_order_onchange_partner(partner_id).await?;
        merge_missing(&mut values, changed);
        Ok(values)
    }
}
