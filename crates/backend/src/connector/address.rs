//! Страна и регион по кодам адреса Salesforce

use super::error::ConnectorError;
use super::mapping::MapContext;
use super::ports::Criterion;
use super::record::{RecordId, SalesforceRecord};

pub async fn country_id(
    ctx: &MapContext<'_>,
    record: &SalesforceRecord,
    code_field: &str,
) -> Result<Option<RecordId>, ConnectorError> {
    let Some(code) = record.str_field(code_field) else {
        return Ok(None);
    };
    let ids = ctx
        .store
        .search("res.country", &[Criterion::ilike("code", code)])
        .await?;
    if ids.is_empty() {
        tracing::debug!("Unknown country code {} in {}", code, code_field);
    }
    Ok(ids.first().copied())
}

/// Регион ищется по названию, затем по коду, внутри найденной страны
pub async fn state_id(
    ctx: &MapContext<'_>,
    record: &SalesforceRecord,
    state_field: &str,
    country_field: &str,
) -> Result<Option<RecordId>, ConnectorError> {
    let Some(state) = record.str_field(state_field) else {
        return Ok(None);
    };
    let Some(country) = country_id(ctx, record, country_field).await? else {
        return Ok(None);
    };
    for key in ["name", "code"] {
        let ids = ctx
            .store
            .search(
                "res.country.state",
                &[Criterion::ilike(key, state), Criterion::eq("country_id", country)],
            )
            .await?;
        if let Some(id) = ids.first() {
            return Ok(Some(*id));
        }
    }
    tracing::debug!("State {} not found for country {}", state, country);
    Ok(None)
}
