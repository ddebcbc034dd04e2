//! Коннектор Salesforce → ERP
//!
//! Таблицы соответствия полей, вычисляемые поля и хуки импорта поверх
//! внешних сервисов (REST API Salesforce, ORM ERP, хранилище привязок),
//! доступных через трейты из [`ports`].

pub mod error;
pub mod ports;
pub mod record;
pub mod soql;

pub mod adapter;
pub mod address;
pub mod mapping;
pub mod pricing;
pub mod synchronizer;

pub mod account;
pub mod opportunity;
pub mod opportunity_line_item;
pub mod pricebook_entry;
pub mod product;

pub mod dispatcher;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::Connector;
pub use error::ConnectorError;
pub use record::{FieldMap, RecordId, SalesforceRecord};
pub use synchronizer::ImportOutcome;
