//! Account → `res.partner`

use crate::connector::address::{country_id, state_id};
use crate::connector::error::ConnectorError;
use crate::connector::mapping::{single, ComputedRule, MapContext, Mapper, MappingRule};
use crate::connector::pricing::pricelist_id;
use crate::connector::record::{is_truthy, relation_value, FieldMap, RecordId, SalesforceRecord};
use async_trait::async_trait;
use contracts::domain::a002_salesforce_binding::aggregate::Binding;
use serde_json::Value;

pub const PARTNER_MODEL: &str = "res.partner";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    IsCompany,
    Country,
    State,
    Customer,
    Active,
    Pricelist,
}

#[derive(Debug, Default)]
pub struct AccountMapper;

#[async_trait]
impl Mapper for AccountMapper {
    type Field = AccountField;

    const DIRECT: &'static [MappingRule] = &[
        MappingRule::new("Name", "name"),
        MappingRule::new("BillingStreet", "street"),
        MappingRule::new("BillingPostalCode", "zip"),
        MappingRule::new("BillingCity", "city"),
        MappingRule::new("Fax", "fax"),
        MappingRule::new("Phone", "phone"),
        // Поле популярного приложения для НДС
        MappingRule::new("VATNumber__c", "vat"),
    ];

    const COMPUTED: &'static [ComputedRule<AccountField>] = &[
        ComputedRule::on_create(AccountField::IsCompany),
        ComputedRule::always(AccountField::Country),
        ComputedRule::always(AccountField::State),
        ComputedRule::always(AccountField::Customer),
        ComputedRule::always(AccountField::Active),
        ComputedRule::always(AccountField::Pricelist),
    ];

    async fn compute(
        &self,
        field: AccountField,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        Ok(match field {
            AccountField::IsCompany => single("is_company", true),
            AccountField::Country => single(
                "country_id",
                relation_value(country_id(ctx, record, "BillingCountryCode").await?),
            ),
            AccountField::State => single(
                "state_id",
                relation_value(
                    state_id(ctx, record, "BillingState", "BillingCountryCode").await?,
                ),
            ),
            AccountField::Customer => single("customer", true),
            AccountField::Active => single("active", true),
            AccountField::Pricelist => single(
                "property_product_pricelist",
                pricelist_id(ctx, record).await?,
            ),
        })
    }
}

fn field_or_false(record: &SalesforceRecord, field: &str) -> Value {
    match record.get(field) {
        Some(value) if is_truthy(value) => value.clone(),
        _ => Value::Bool(false),
    }
}

impl AccountMapper {
    /// Есть ли в записи хоть одно непустое поле `Shipping*`
    pub fn has_shipping_address(record: &SalesforceRecord) -> bool {
        record
            .fields_with_prefix("Shipping")
            .any(|(_, value)| is_truthy(value))
    }

    async fn shipping_address_values(
        &self,
        record: &SalesforceRecord,
        binding: &Binding,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        let mut values = FieldMap::new();
        values.insert("name".into(), field_or_false(record, "Name"));
        values.insert("street".into(), field_or_false(record, "ShippingStreet"));
        values.insert("zip".into(), field_or_false(record, "ShippingPostalCode"));
        values.insert("city".into(), field_or_false(record, "ShippingCity"));
        values.insert("phone".into(), field_or_false(record, "Phone"));
        values.insert("parent_id".into(), Value::from(binding.erp_id));
        values.insert("type".into(), Value::from("delivery"));
        values.insert("customer".into(), Value::Bool(true));
        values.insert(
            "country_id".into(),
            relation_value(country_id(ctx, record, "ShippingCountryCode").await?),
        );
        values.insert(
            "state_id".into(),
            relation_value(
                state_id(ctx, record, "ShippingState", "ShippingCountryCode").await?,
            ),
        );
        Ok(values)
    }

    /// Адрес доставки как дочерний контрагент
    ///
    /// Нет адреса в ERP: создаётся; есть: обновляется. Если поля доставки
    /// в Salesforce пусты, существующий адрес деактивируется (не удаляется).
    pub async fn map_shipping_address(
        &self,
        record: &SalesforceRecord,
        binding: Option<&Binding>,
        ctx: &MapContext<'_>,
    ) -> Result<Option<RecordId>, ConnectorError> {
        let binding = binding.ok_or_else(|| {
            ConnectorError::mapping("No binding found when mapping shipping address")
        })?;

        if Self::has_shipping_address(record) {
            let values = self.shipping_address_values(record, binding, ctx).await?;
            match binding.shipping_partner_id {
                Some(partner_id) => {
                    ctx.store.write(PARTNER_MODEL, &[partner_id], &values).await?;
                    Ok(Some(partner_id))
                }
                None => Ok(Some(ctx.store.create(PARTNER_MODEL, &values).await?)),
            }
        } else {
            if let Some(partner_id) = binding.shipping_partner_id {
                tracing::info!(
                    "Deactivating shipping address {} of partner {}",
                    partner_id,
                    binding.erp_id
                );
                ctx.store
                    .write(PARTNER_MODEL, &[partner_id], &single("active", false))
                    .await?;
            }
            Ok(None)
        }
    }
}
