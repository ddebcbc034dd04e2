use axum::{extract::Path, Json};
use contracts::domain::a002_salesforce_binding::aggregate::Binding;

use crate::domain::a002_salesforce_binding;

/// GET /api/a001_salesforce_backend/:id/bindings
pub async fn list_by_backend(
    Path(id): Path<String>,
) -> Result<Json<Vec<Binding>>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_salesforce_binding::repository::list_by_backend(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list bindings of backend {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
