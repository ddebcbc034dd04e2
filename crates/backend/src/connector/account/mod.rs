pub mod importer;
pub mod mapper;
