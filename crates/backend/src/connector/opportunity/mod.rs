pub mod adapter;
pub mod importer;
pub mod mapper;
