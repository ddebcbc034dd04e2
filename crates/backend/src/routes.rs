use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 Salesforce backend
        // ========================================
        .route(
            "/api/a001_salesforce_backend",
            get(handlers::a001_salesforce_backend::list_all)
                .post(handlers::a001_salesforce_backend::upsert),
        )
        .route(
            "/api/a001_salesforce_backend/:id",
            get(handlers::a001_salesforce_backend::get_by_id)
                .delete(handlers::a001_salesforce_backend::delete),
        )
        // A002 Bindings of a backend
        .route(
            "/api/a001_salesforce_backend/:id/bindings",
            get(handlers::a002_salesforce_binding::list_by_backend),
        )
        // ========================================
        // UseCase u601: Import from Salesforce
        // ========================================
        .route(
            "/api/u601/import/start",
            post(handlers::usecases::u601_start_import),
        )
        .route(
            "/api/u601/import/:session_id/progress",
            get(handlers::usecases::u601_get_progress),
        )
        .route(
            "/api/u601/import/record",
            post(handlers::usecases::u601_import_record),
        )
}
