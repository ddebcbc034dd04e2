pub mod u601_import_from_salesforce;
