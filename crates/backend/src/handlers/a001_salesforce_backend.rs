use axum::{extract::Path, Json};
use contracts::domain::a001_salesforce_backend::aggregate::{
    SalesforceBackend, SalesforceBackendDto,
};
use serde_json::json;

use crate::domain::a001_salesforce_backend;

/// GET /api/a001_salesforce_backend
pub async fn list_all() -> Result<Json<Vec<SalesforceBackend>>, axum::http::StatusCode> {
    match a001_salesforce_backend::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list Salesforce backends: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a001_salesforce_backend/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<SalesforceBackend>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a001_salesforce_backend::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/a001_salesforce_backend/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };

    match a001_salesforce_backend::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/a001_salesforce_backend
pub async fn upsert(
    Json(dto): Json<SalesforceBackendDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    // Определяем операцию: create или update
    let result = match dto.id.clone() {
        Some(id) => a001_salesforce_backend::service::update(dto).await.map(|_| id),
        None => a001_salesforce_backend::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save Salesforce backend: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
