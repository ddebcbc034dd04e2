//! Таблицы прямого соответствия полей и вычисляемые поля
//!
//! Каждый маппер объявляет упорядоченную таблицу [`MappingRule`] и список
//! вычисляемых полей [`ComputedRule`] над собственным enum. [`map_record`]
//! применяет сначала прямые правила, затем вычисляемые поля по порядку
//! регистрации и в конце [`Mapper::finalize`].

use super::error::ConnectorError;
use super::ports::{Binder, ErpStore, SalesforceApi};
use super::record::{is_truthy, FieldMap, SalesforceRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_salesforce_backend::aggregate::SalesforceBackend;
use serde_json::Value;

/// Пара (поле Salesforce, поле ERP)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRule {
    pub source: &'static str,
    pub target: &'static str,
}

impl MappingRule {
    pub const fn new(source: &'static str, target: &'static str) -> Self {
        Self { source, target }
    }
}

/// Регистрация вычисляемого поля
#[derive(Debug, Clone, Copy)]
pub struct ComputedRule<F> {
    pub field: F,
    /// Вычислять только при создании записи
    pub only_create: bool,
}

impl<F> ComputedRule<F> {
    pub const fn always(field: F) -> Self {
        Self {
            field,
            only_create: false,
        }
    }

    pub const fn on_create(field: F) -> Self {
        Self {
            field,
            only_create: true,
        }
    }
}

/// Всё, что нужно мапперу кроме самой записи
pub struct MapContext<'a> {
    pub backend: &'a SalesforceBackend,
    pub api: &'a dyn SalesforceApi,
    pub store: &'a dyn ErpStore,
    pub binder: &'a dyn Binder,
    /// Маппинг для новой записи (а не для обновления)
    pub for_create: bool,
    pub today: NaiveDate,
}

#[async_trait]
pub trait Mapper: Send + Sync {
    type Field: Copy + Send + Sync + std::fmt::Debug + 'static;

    const DIRECT: &'static [MappingRule];
    const COMPUTED: &'static [ComputedRule<Self::Field>];

    async fn compute(
        &self,
        field: Self::Field,
        record: &SalesforceRecord,
        ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError>;

    async fn finalize(
        &self,
        values: FieldMap,
        _ctx: &MapContext<'_>,
    ) -> Result<FieldMap, ConnectorError> {
        Ok(values)
    }
}

/// Прямые правила: пустое или отсутствующее значение даёт `false`
pub fn map_direct(rules: &[MappingRule], record: &SalesforceRecord) -> FieldMap {
    rules
        .iter()
        .map(|rule| {
            let value = match record.get(rule.source) {
                Some(value) if is_truthy(value) => value.clone(),
                _ => Value::Bool(false),
            };
            (rule.target.to_string(), value)
        })
        .collect()
}

/// Полный словарь полей для записи в ERP
pub async fn map_record<M: Mapper>(
    mapper: &M,
    record: &SalesforceRecord,
    ctx: &MapContext<'_>,
) -> Result<FieldMap, ConnectorError> {
    let mut values = map_direct(M::DIRECT, record);
    for rule in M::COMPUTED {
        if rule.only_create && !ctx.for_create {
            continue;
        }
        let partial = mapper.compute(rule.field, record, ctx).await?;
        tracing::trace!("Computed {:?}: {:?}", rule.field, partial);
        values.extend(partial);
    }
    mapper.finalize(values, ctx).await
}

/// Добавить значения бизнес-правил ERP, не перетирая явно смапленные поля
pub fn merge_missing(values: &mut FieldMap, changed: FieldMap) {
    for (key, value) in changed {
        values.entry(key).or_insert(value);
    }
}

/// Один ключ: одно значение
pub fn single(key: &str, value: impl Into<Value>) -> FieldMap {
    let mut values = FieldMap::new();
    values.insert(key.to_string(), value.into());
    values
}
