//! Импорт одной записи
//!
//! ```text
//! read → must_skip → to_deactivate → dependencies → map → write/create+bind → after_import
//! ```
//!
//! Словарь полей строится целиком до первой записи в ERP: ошибка маппинга
//! прерывает импорт без частичных изменений.

use super::adapter::SalesforceAdapter;
use super::error::ConnectorError;
use super::mapping::{map_record, MapContext, Mapper};
use super::ports::{Binder, ErpStore, ImportTrigger, SalesforceApi};
use super::record::{FieldMap, RecordId, SalesforceRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_salesforce_backend::aggregate::{ProductMaster, SalesforceBackend};
use contracts::domain::a002_salesforce_binding::aggregate::{Binding, SalesforceModel};
use serde_json::Value;

/// Итог импорта записи
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Imported { binding: Binding, created: bool },
    Skipped(String),
    Deactivated,
}

/// Когда нужно импортировать связанную запись
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reimport {
    /// Всегда, даже если привязка уже есть
    Always,
    /// Если привязки нет
    WhenUnbound,
    /// Если привязки нет и товары ведутся в Salesforce
    WhenUnboundAndSalesforceMaster,
}

/// Связанная запись, которая должна существовать до маппинга
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub model: SalesforceModel,
    pub salesforce_id: String,
    pub reimport: Reimport,
}

impl Dependency {
    pub fn new(model: SalesforceModel, salesforce_id: impl Into<String>, reimport: Reimport) -> Self {
        Self {
            model,
            salesforce_id: salesforce_id.into(),
            reimport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyResolution {
    Resolved(RecordId),
    NeedsImport,
    /// Не привязана, но импортировать её не нам
    NotRequired,
}

/// Окружение одной единицы импорта
pub struct ImportEnv<'a> {
    pub backend: &'a SalesforceBackend,
    pub api: &'a dyn SalesforceApi,
    pub store: &'a dyn ErpStore,
    pub binder: &'a dyn Binder,
    pub trigger: &'a dyn ImportTrigger,
    pub today: NaiveDate,
}

impl<'a> ImportEnv<'a> {
    pub fn map_context(&self, for_create: bool) -> MapContext<'a> {
        MapContext {
            backend: self.backend,
            api: self.api,
            store: self.store,
            binder: self.binder,
            for_create,
            today: self.today,
        }
    }
}

/// Политики импорта конкретной сущности
#[async_trait]
pub trait ImportHooks: Send + Sync {
    type Mapper: Mapper;

    const MODEL: SalesforceModel;

    fn mapper(&self) -> &Self::Mapper;

    /// `Some(reason)`: запись пропускается
    async fn must_skip(
        &self,
        _salesforce_id: &str,
        _record: &SalesforceRecord,
        _env: &ImportEnv<'_>,
    ) -> Result<Option<String>, ConnectorError> {
        Ok(None)
    }

    async fn to_deactivate(
        &self,
        _salesforce_id: &str,
        record: &SalesforceRecord,
        _env: &ImportEnv<'_>,
    ) -> Result<bool, ConnectorError> {
        Ok(record.is_truthy("IsDeleted"))
    }

    /// По умолчанию запись ERP помечается неактивной
    async fn deactivate(
        &self,
        salesforce_id: &str,
        env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        if let Some(binding) = env.binder.to_binding(Self::MODEL, salesforce_id).await? {
            let mut values = FieldMap::new();
            values.insert("active".into(), Value::Bool(false));
            env.store
                .write(Self::MODEL.erp_model(), &[binding.erp_id], &values)
                .await?;
        }
        Ok(())
    }

    fn dependencies(&self, _record: &SalesforceRecord) -> Vec<Dependency> {
        Vec::new()
    }

    async fn after_import(
        &self,
        _binding: &Binding,
        _record: &SalesforceRecord,
        _env: &ImportEnv<'_>,
    ) -> Result<(), ConnectorError> {
        Ok(())
    }
}

pub async fn resolve_dependency(
    dependency: &Dependency,
    env: &ImportEnv<'_>,
) -> Result<DependencyResolution, ConnectorError> {
    if dependency.reimport == Reimport::Always {
        return Ok(DependencyResolution::NeedsImport);
    }
    if let Some(erp_id) = env
        .binder
        .to_erp_id(dependency.model, &dependency.salesforce_id)
        .await?
    {
        return Ok(DependencyResolution::Resolved(erp_id));
    }
    match dependency.reimport {
        Reimport::WhenUnboundAndSalesforceMaster
            if env.backend.product_master != ProductMaster::Salesforce =>
        {
            Ok(DependencyResolution::NotRequired)
        }
        _ => Ok(DependencyResolution::NeedsImport),
    }
}

pub async fn run<H: ImportHooks>(
    hooks: &H,
    salesforce_id: &str,
    env: &ImportEnv<'_>,
) -> Result<ImportOutcome, ConnectorError> {
    let model = H::MODEL;
    let record = SalesforceAdapter::new(env.api, model)
        .read(salesforce_id)
        .await?;

    if let Some(reason) = hooks.must_skip(salesforce_id, &record, env).await? {
        tracing::info!("Skipping {} {}: {}", model, salesforce_id, reason);
        return Ok(ImportOutcome::Skipped(reason));
    }

    if hooks.to_deactivate(salesforce_id, &record, env).await? {
        tracing::info!("Deactivating {} {}", model, salesforce_id);
        hooks.deactivate(salesforce_id, env).await?;
        return Ok(ImportOutcome::Deactivated);
    }

    for dependency in hooks.dependencies(&record) {
        match resolve_dependency(&dependency, env).await? {
            DependencyResolution::NeedsImport => {
                tracing::debug!(
                    "Importing dependency {} {} of {} {}",
                    dependency.model,
                    dependency.salesforce_id,
                    model,
                    salesforce_id
                );
                env.trigger
                    .import_record(dependency.model, &dependency.salesforce_id)
                    .await?;
            }
            DependencyResolution::Resolved(_) | DependencyResolution::NotRequired => {}
        }
    }

    let existing = env.binder.to_binding(model, salesforce_id).await?;
    let ctx = env.map_context(existing.is_none());
    let values = map_record(hooks.mapper(), &record, &ctx).await?;

    let (binding, created) = match existing {
        Some(binding) => {
            env.store
                .write(model.erp_model(), &[binding.erp_id], &values)
                .await?;
            let binding = env.binder.bind(model, salesforce_id, binding.erp_id).await?;
            (binding, false)
        }
        None => {
            let erp_id = env.store.create(model.erp_model(), &values).await?;
            let binding = env.binder.bind(model, salesforce_id, erp_id).await?;
            (binding, true)
        }
    };
    tracing::info!(
        "{} {} {} as {} #{}",
        model,
        salesforce_id,
        if created { "created" } else { "updated" },
        model.erp_model(),
        binding.erp_id
    );

    if let Err(e) = hooks.after_import(&binding, &record, env).await {
        // Только что созданная запись без своих зависимых данных не должна
        // оставаться привязанной: следующий запуск её бы пропустил
        if created {
            tracing::warn!(
                "Rolling back {} {} after failed post-import step: {}",
                model,
                salesforce_id,
                e
            );
            discard(model, &binding, env).await;
        }
        return Err(e);
    }
    Ok(ImportOutcome::Imported { binding, created })
}

/// Удаляет созданную запись ERP и её привязку
///
/// Ошибки отката только логируются: вызывающему важнее исходная ошибка.
pub async fn discard(model: SalesforceModel, binding: &Binding, env: &ImportEnv<'_>) {
    if let Err(e) = env.store.unlink(model.erp_model(), &[binding.erp_id]).await {
        tracing::error!(
            "Failed to unlink {} #{}: {}",
            model.erp_model(),
            binding.erp_id,
            e
        );
    }
    if let Err(e) = env.binder.unbind(binding.id).await {
        tracing::error!(
            "Failed to unbind {} {}: {}",
            model,
            binding.salesforce_id,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::testing::{backend, Fixture};

    #[tokio::test]
    async fn test_resolve_dependency_policies() {
        let fixture = Fixture::new(backend());
        fixture.bind(SalesforceModel::Product, "01tBOUND", 42);
        let env = fixture.env();

        let bound = Dependency::new(SalesforceModel::Product, "01tBOUND", Reimport::WhenUnbound);
        assert_eq!(
            resolve_dependency(&bound, &env).await.unwrap(),
            DependencyResolution::Resolved(42)
        );

        let always = Dependency::new(SalesforceModel::Product, "01tBOUND", Reimport::Always);
        assert_eq!(
            resolve_dependency(&always, &env).await.unwrap(),
            DependencyResolution::NeedsImport
        );

        let missing = Dependency::new(
            SalesforceModel::Product,
            "01tMISSING",
            Reimport::WhenUnboundAndSalesforceMaster,
        );
        assert_eq!(
            resolve_dependency(&missing, &env).await.unwrap(),
            DependencyResolution::NeedsImport
        );
    }

    #[tokio::test]
    async fn test_erp_product_master_does_not_import_products() {
        let mut config = backend();
        config.product_master = ProductMaster::Erp;
        let fixture = Fixture::new(config);
        let env = fixture.env();
        let missing = Dependency::new(
            SalesforceModel::Product,
            "01tMISSING",
            Reimport::WhenUnboundAndSalesforceMaster,
        );
        assert_eq!(
            resolve_dependency(&missing, &env).await.unwrap(),
            DependencyResolution::NotRequired
        );
    }
}
