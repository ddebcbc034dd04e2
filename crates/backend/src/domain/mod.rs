pub mod a001_salesforce_backend;
pub mod a002_salesforce_binding;
