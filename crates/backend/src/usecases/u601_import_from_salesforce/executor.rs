use super::erp_rpc_client::ErpRpcClient;
use super::progress_tracker::{ModelCounters, ProgressTracker};
use super::salesforce_client::SalesforceRestClient;
use crate::connector::ports::ImportTrigger;
use crate::connector::{Connector, ImportOutcome};
use crate::domain::{a001_salesforce_backend, a002_salesforce_binding::repository::SqliteBinder};
use crate::shared::config::ErpConfig;
use crate::shared::data::db::get_connection;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use contracts::domain::a001_salesforce_backend::aggregate::SalesforceBackend;
use contracts::domain::a002_salesforce_binding::aggregate::SalesforceModel;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_import_from_salesforce::{
    progress::{ImportProgress, ImportStatus},
    request::{ImportRecordRequest, ImportRequest},
    response::{ImportRecordResponse, ImportResponse, ImportStartStatus},
    ImportFromSalesforce,
};
use std::sync::Arc;
use uuid::Uuid;

/// Salesforce отдаёт `getUpdated` не глубже 30 дней
const MAX_UPDATED_WINDOW_DAYS: i64 = 29;

/// Окно изменений для модели: явные границы запроса, иначе от прошлой
/// загрузки до текущего момента
///
/// Начало окна не раньше чем 29 дней назад, иначе Salesforce отклонит запрос.
pub fn import_window(
    backend: &SalesforceBackend,
    model: SalesforceModel,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = date_to.unwrap_or(now);
    let earliest = now - Duration::days(MAX_UPDATED_WINDOW_DAYS);
    let start = date_from
        .or_else(|| backend.last_sync_for(model.code()))
        .map_or(earliest, |start| start.max(earliest))
        .min(end);
    (start, end)
}

impl From<ImportOutcome> for ImportRecordResponse {
    fn from(outcome: ImportOutcome) -> Self {
        match outcome {
            ImportOutcome::Imported { binding, created } => ImportRecordResponse::Imported {
                binding_id: binding.id.to_string(),
                erp_id: binding.erp_id,
                created,
            },
            ImportOutcome::Skipped(reason) => ImportRecordResponse::Skipped { reason },
            ImportOutcome::Deactivated => ImportRecordResponse::Deactivated,
        }
    }
}

/// Executor для UseCase импорта из Salesforce
#[derive(Clone)]
pub struct ImportExecutor {
    erp_config: ErpConfig,
    progress_tracker: Arc<ProgressTracker>,
}

impl ImportExecutor {
    pub fn new(erp_config: ErpConfig, progress_tracker: Arc<ProgressTracker>) -> Self {
        Self {
            erp_config,
            progress_tracker,
        }
    }

    async fn load_backend(&self, backend_id: &str) -> Result<SalesforceBackend> {
        let id = Uuid::parse_str(backend_id).map_err(|_| anyhow::anyhow!("Invalid backend_id"))?;
        a001_salesforce_backend::service::get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Backend not found"))
    }

    fn build_connector(&self, backend: SalesforceBackend) -> Result<Connector> {
        let api = Arc::new(SalesforceRestClient::new(&backend)?);
        let store = Arc::new(ErpRpcClient::new(&self.erp_config)?);
        let binder = Arc::new(SqliteBinder::new(backend.base.id, get_connection().clone()));
        Ok(Connector::new(backend, api, store, binder))
    }

    /// Запустить импорт (создает async task и возвращает session_id)
    pub async fn start_import(&self, request: ImportRequest) -> Result<ImportResponse> {
        if request.target_models.is_empty() {
            anyhow::bail!("No models selected for import");
        }
        if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
            if from > to {
                anyhow::bail!("date_from must not be after date_to");
            }
        }

        let backend = self.load_backend(&request.backend_id).await?;
        let connector = self.build_connector(backend)?;

        let session_id = Uuid::new_v4().to_string();
        self.progress_tracker.create_session(session_id.clone());
        for model_code in &request.target_models {
            self.progress_tracker
                .add_model(&session_id, model_code.clone());
        }

        let self_clone = self.clone();
        let session_id_clone = session_id.clone();
        tokio::spawn(async move {
            self_clone
                .run_import(&session_id_clone, &request, &connector)
                .await;
        });

        Ok(ImportResponse {
            session_id,
            status: ImportStartStatus::Started,
            message: "Import started".to_string(),
        })
    }

    /// Получить текущий прогресс импорта
    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    /// Импорт одной записи в текущем запросе
    pub async fn import_single(&self, request: ImportRecordRequest) -> Result<ImportRecordResponse> {
        let model = SalesforceModel::from_code(&request.model)
            .ok_or_else(|| anyhow::anyhow!("Unknown model: {}", request.model))?;
        let backend = self.load_backend(&request.backend_id).await?;
        let connector = self.build_connector(backend)?;

        tracing::info!("Importing single {} {}", model, request.salesforce_id);
        let outcome = connector
            .import_record(model, &request.salesforce_id)
            .await?;
        Ok(outcome.into())
    }

    /// Выполнить импорт всех выбранных моделей
    async fn run_import(&self, session_id: &str, request: &ImportRequest, connector: &Connector) {
        tracing::info!(
            "Starting {} for session {} (backend {})",
            ImportFromSalesforce::full_name(),
            session_id,
            connector.backend().name()
        );
        let backend_id = connector.backend().base.id.value();

        for model_code in &request.target_models {
            let Some(model) = SalesforceModel::from_code(model_code) else {
                let msg = format!("Unknown model: {}", model_code);
                tracing::warn!("{}", msg);
                self.progress_tracker
                    .add_error(session_id, Some(model_code.clone()), msg, None);
                self.progress_tracker.fail_model(session_id, model_code);
                continue;
            };

            let (start, end) = import_window(
                connector.backend(),
                model,
                request.date_from,
                request.date_to,
                Utc::now(),
            );

            match self
                .import_model(session_id, connector, model, start, end)
                .await
            {
                Ok(0) => {
                    if let Err(e) =
                        a001_salesforce_backend::service::record_sync(backend_id, model.code(), end)
                            .await
                    {
                        tracing::error!("Failed to store last sync of {}: {}", model_code, e);
                        self.progress_tracker.add_error(
                            session_id,
                            Some(model_code.clone()),
                            "Failed to store last sync date".to_string(),
                            Some(e.to_string()),
                        );
                    }
                }
                Ok(errors) => {
                    tracing::warn!(
                        "{} finished with {} errors, last sync date kept",
                        model_code,
                        errors
                    );
                }
                Err(e) => {
                    tracing::error!("Import of {} failed: {}", model_code, e);
                    self.progress_tracker.add_error(
                        session_id,
                        Some(model_code.clone()),
                        format!("Import of {} failed", model_code),
                        Some(e.to_string()),
                    );
                    self.progress_tracker.fail_model(session_id, model_code);
                }
            }
        }

        let final_status = if self
            .progress_tracker
            .get_progress(session_id)
            .map(|p| p.total_errors > 0)
            .unwrap_or(false)
        {
            ImportStatus::CompletedWithErrors
        } else {
            ImportStatus::Completed
        };

        self.progress_tracker
            .complete_session(session_id, final_status);
        tracing::info!(
            "{} completed for session: {}",
            ImportFromSalesforce::display_name(),
            session_id
        );
    }

    /// Импорт изменённых записей одной модели; возвращает число ошибок по записям
    async fn import_model(
        &self,
        session_id: &str,
        connector: &Connector,
        model: SalesforceModel,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i32> {
        let code = model.code();
        tracing::info!("Importing {} updated between {} and {}", model, start, end);

        let ids = connector.list_updated(model, start, end).await?;
        let total = Some(ids.len() as i32);
        let mut counters = ModelCounters::default();
        let mut errors = 0;
        self.progress_tracker
            .update_model(session_id, code, counters, total);

        for salesforce_id in ids {
            self.progress_tracker
                .set_current_item(session_id, code, Some(salesforce_id.clone()));

            match connector.import_record(model, &salesforce_id).await {
                Ok(ImportOutcome::Imported { created: true, .. }) => counters.inserted += 1,
                Ok(ImportOutcome::Imported { created: false, .. })
                | Ok(ImportOutcome::Deactivated) => counters.updated += 1,
                Ok(ImportOutcome::Skipped(reason)) => {
                    tracing::debug!("{} {} skipped: {}", model, salesforce_id, reason);
                    counters.skipped += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to import {} {}: {}", model, salesforce_id, e);
                    self.progress_tracker.add_error(
                        session_id,
                        Some(code.to_string()),
                        format!("Failed to import {}", salesforce_id),
                        Some(e.to_string()),
                    );
                    errors += 1;
                }
            }

            counters.processed += 1;
            self.progress_tracker
                .update_model(session_id, code, counters, total);
        }

        self.progress_tracker.complete_model(session_id, code);
        Ok(errors)
    }
}
