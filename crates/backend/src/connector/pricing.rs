//! Цены: валюта записи → версия прайс-листа из настроек backend

use super::error::ConnectorError;
use super::mapping::MapContext;
use super::record::{many2one_id, RecordId, SalesforceRecord};

pub const PRICELIST_VERSION_MODEL: &str = "product.pricelist.version";

/// ISO-код валюты записи; без CurrencyIsoCode: валюта backend по умолчанию
pub fn currency_code(ctx: &MapContext<'_>, record: &SalesforceRecord) -> String {
    record
        .str_field("CurrencyIsoCode")
        .map(str::to_string)
        .unwrap_or_else(|| ctx.backend.default_currency.clone())
}

pub fn pricelist_version_id(
    ctx: &MapContext<'_>,
    record: &SalesforceRecord,
) -> Result<RecordId, ConnectorError> {
    let currency = currency_code(ctx, record);
    ctx.backend.pricelist_version_for(&currency).ok_or_else(|| {
        ConnectorError::mapping(format!(
            "No pricelist version configuration done for currency {} and backend {}",
            currency,
            ctx.backend.name()
        ))
    })
}

/// Прайс-лист, которому принадлежит настроенная версия
pub async fn pricelist_id(
    ctx: &MapContext<'_>,
    record: &SalesforceRecord,
) -> Result<RecordId, ConnectorError> {
    let version_id = pricelist_version_id(ctx, record)?;
    let version = ctx
        .store
        .browse(PRICELIST_VERSION_MODEL, version_id)
        .await?
        .ok_or_else(|| {
            ConnectorError::mapping(format!(
                "Pricelist version {} configured on backend {} does not exist",
                version_id,
                ctx.backend.name()
            ))
        })?;
    version
        .get("pricelist_id")
        .and_then(many2one_id)
        .ok_or_else(|| {
            ConnectorError::mapping(format!(
                "Pricelist version {} has no pricelist",
                version_id
            ))
        })
}
