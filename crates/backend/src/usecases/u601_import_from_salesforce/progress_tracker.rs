use contracts::usecases::u601_import_from_salesforce::progress::{
    ImportProgress, ImportStatus, ModelImportStatus, ModelProgress,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Счётчики одной модели в ходе пакетного импорта
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelCounters {
    pub processed: i32,
    pub inserted: i32,
    pub updated: i32,
    pub skipped: i32,
}

/// Трекер прогресса импорта (in-memory, для real-time мониторинга)
#[derive(Clone, Default)]
pub struct ProgressTracker {
    sessions: Arc<RwLock<HashMap<String, ImportProgress>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Упавший поток не должен блокировать мониторинг остальных сессий
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ImportProgress>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ImportProgress>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn with_model(
        &self,
        session_id: &str,
        model: &str,
        apply: impl FnOnce(&mut ModelProgress),
    ) {
        let mut sessions = self.write();
        if let Some(progress) = sessions.get_mut(session_id) {
            if let Some(entry) = progress.models.iter_mut().find(|m| m.model == model) {
                apply(entry);
                progress.recompute_totals();
                progress.updated_at = chrono::Utc::now();
            }
        }
    }

    /// Создать новую сессию импорта
    pub fn create_session(&self, session_id: String) {
        self.write()
            .insert(session_id.clone(), ImportProgress::new(session_id));
    }

    /// Получить текущий прогресс сессии
    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.read().get(session_id).cloned()
    }

    /// Добавить модель для отслеживания
    pub fn add_model(&self, session_id: &str, model: String) {
        let mut sessions = self.write();
        if let Some(progress) = sessions.get_mut(session_id) {
            progress.models.push(ModelProgress {
                model,
                status: ModelImportStatus::Pending,
                processed: 0,
                total: None,
                inserted: 0,
                updated: 0,
                skipped: 0,
                errors: 0,
                current_item: None,
            });
            progress.updated_at = chrono::Utc::now();
        }
    }

    /// Обновить прогресс модели
    pub fn update_model(
        &self,
        session_id: &str,
        model: &str,
        counters: ModelCounters,
        total: Option<i32>,
    ) {
        self.with_model(session_id, model, |entry| {
            entry.status = ModelImportStatus::Running;
            entry.processed = counters.processed;
            entry.inserted = counters.inserted;
            entry.updated = counters.updated;
            entry.skipped = counters.skipped;
            entry.total = total;
        });
    }

    /// Установить текущую обрабатываемую запись
    pub fn set_current_item(&self, session_id: &str, model: &str, item: Option<String>) {
        self.with_model(session_id, model, |entry| entry.current_item = item);
    }

    pub fn complete_model(&self, session_id: &str, model: &str) {
        self.with_model(session_id, model, |entry| {
            entry.status = ModelImportStatus::Completed;
            entry.current_item = None;
        });
    }

    pub fn fail_model(&self, session_id: &str, model: &str) {
        self.with_model(session_id, model, |entry| {
            entry.status = ModelImportStatus::Failed;
            entry.current_item = None;
        });
    }

    /// Добавить ошибку; ошибка с указанной моделью учитывается и в её счётчике
    pub fn add_error(
        &self,
        session_id: &str,
        model: Option<String>,
        message: String,
        details: Option<String>,
    ) {
        let mut sessions = self.write();
        if let Some(progress) = sessions.get_mut(session_id) {
            if let Some(code) = &model {
                if let Some(entry) = progress.models.iter_mut().find(|m| &m.model == code) {
                    entry.errors += 1;
                }
            }
            progress.add_error(model, message, details);
            progress.updated_at = chrono::Utc::now();
        }
    }

    /// Завершить сессию импорта
    pub fn complete_session(&self, session_id: &str, status: ImportStatus) {
        let mut sessions = self.write();
        if let Some(progress) = sessions.get_mut(session_id) {
            progress.status = status;
            progress.completed_at = Some(chrono::Utc::now());
            progress.updated_at = chrono::Utc::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_roll_up_into_totals() {
        let tracker = ProgressTracker::new();
        tracker.create_session("s1".to_string());
        tracker.add_model("s1", "account".to_string());
        tracker.add_model("s1", "product".to_string());

        tracker.update_model(
            "s1",
            "account",
            ModelCounters {
                processed: 3,
                inserted: 2,
                updated: 1,
                skipped: 0,
            },
            Some(3),
        );
        tracker.update_model(
            "s1",
            "product",
            ModelCounters {
                processed: 2,
                inserted: 0,
                updated: 1,
                skipped: 1,
            },
            None,
        );

        let progress = tracker.get_progress("s1").unwrap();
        assert_eq!(progress.total_processed, 5);
        assert_eq!(progress.total_inserted, 2);
        assert_eq!(progress.total_updated, 2);
        assert_eq!(progress.total_skipped, 1);
        assert_eq!(progress.models[0].status, ModelImportStatus::Running);
    }

    #[test]
    fn test_errors_are_counted_per_model() {
        let tracker = ProgressTracker::new();
        tracker.create_session("s1".to_string());
        tracker.add_model("s1", "account".to_string());

        tracker.add_error(
            "s1",
            Some("account".to_string()),
            "Failed to import 001A".to_string(),
            Some("Mapping error".to_string()),
        );
        tracker.add_error("s1", None, "Unknown model: lead".to_string(), None);
        tracker.fail_model("s1", "account");
        tracker.complete_session("s1", ImportStatus::CompletedWithErrors);

        let progress = tracker.get_progress("s1").unwrap();
        assert_eq!(progress.total_errors, 2);
        assert_eq!(progress.models[0].errors, 1);
        assert_eq!(progress.models[0].status, ModelImportStatus::Failed);
        assert_eq!(progress.status, ImportStatus::CompletedWithErrors);
        assert!(progress.completed_at.is_some());
    }

    #[test]
    fn test_unknown_session_is_ignored() {
        let tracker = ProgressTracker::new();
        tracker.add_model("missing", "account".to_string());
        tracker.set_current_item("missing", "account", Some("001A".to_string()));
        assert!(tracker.get_progress("missing").is_none());
    }
}
