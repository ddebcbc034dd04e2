use super::repository;
use crate::shared::data::db::get_connection;
use chrono::{DateTime, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::{
    SalesforceBackend, SalesforceBackendDto,
};
use uuid::Uuid;

/// Создание нового backend
pub async fn create(dto: SalesforceBackendDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("SF-{}", Uuid::new_v4()));
    let mut aggregate =
        SalesforceBackend::new_for_insert(code, dto.description.clone(), dto.login_url.clone());
    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::insert(get_connection(), &aggregate).await
}

/// Обновление существующего backend
pub async fn update(dto: SalesforceBackendDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(get_connection(), id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    aggregate.before_write();

    repository::update(get_connection(), &aggregate).await
}

/// Мягкое удаление
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(get_connection(), id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<SalesforceBackend>> {
    repository::get_by_id(get_connection(), id).await
}

pub async fn list_all() -> anyhow::Result<Vec<SalesforceBackend>> {
    repository::list_all(get_connection()).await
}

/// Запомнить конец окна успешного импорта модели
pub async fn record_sync(id: Uuid, model_code: &str, at: DateTime<Utc>) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(get_connection(), id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Backend {} not found", id))?;
    aggregate.set_last_sync(model_code, at);
    repository::update_last_sync(get_connection(), id, &aggregate.last_sync).await
}
