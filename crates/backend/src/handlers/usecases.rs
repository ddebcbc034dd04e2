use axum::{extract::Path, http::StatusCode, Json};
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u601_import_from_salesforce::{
    progress::ImportProgress, ImportRecordRequest, ImportRecordResponse, ImportRequest,
    ImportResponse,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::connector::ConnectorError;
use crate::shared::config::load_config;
use crate::usecases;

// ============================================================================
// UseCase u601: Import from Salesforce
// ============================================================================

static IMPORT_EXECUTOR: Lazy<Arc<usecases::u601_import_from_salesforce::ImportExecutor>> =
    Lazy::new(|| {
        let erp_config = load_config()
            .map(|config| config.erp)
            .unwrap_or_else(|e| {
                tracing::warn!("Using default ERP settings: {}", e);
                Default::default()
            });
        let tracker = Arc::new(usecases::u601_import_from_salesforce::ProgressTracker::new());
        Arc::new(usecases::u601_import_from_salesforce::ImportExecutor::new(
            erp_config, tracker,
        ))
    });

/// Ответ на ошибку импорта одной записи: маппинг → 422, остальное → 500
fn record_error(e: &anyhow::Error) -> (StatusCode, UseCaseError) {
    match e.downcast_ref::<ConnectorError>() {
        Some(err @ ConnectorError::Mapping(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            UseCaseError::mapping(err.to_string()),
        ),
        Some(err @ ConnectorError::NotSupported(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            UseCaseError::validation(err.to_string()),
        ),
        Some(err @ (ConnectorError::Api(_) | ConnectorError::Erp(_))) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            UseCaseError::external(err.to_string()),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            UseCaseError::internal(e.to_string()),
        ),
    }
}

/// POST /api/u601/import/start
pub async fn u601_start_import(
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, StatusCode> {
    match IMPORT_EXECUTOR.start_import(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Failed to start Salesforce import: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/u601/import/:session_id/progress
pub async fn u601_get_progress(
    Path(session_id): Path<String>,
) -> Result<Json<ImportProgress>, StatusCode> {
    match IMPORT_EXECUTOR.get_progress(&session_id) {
        Some(progress) => Ok(Json(progress)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// POST /api/u601/import/record
pub async fn u601_import_record(
    Json(request): Json<ImportRecordRequest>,
) -> Result<Json<ImportRecordResponse>, (StatusCode, Json<UseCaseError>)> {
    match IMPORT_EXECUTOR.import_single(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Failed to import Salesforce record: {}", e);
            let (status, body) = record_error(&e);
            Err((status, Json(body)))
        }
    }
}
