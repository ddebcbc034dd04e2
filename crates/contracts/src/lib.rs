//! Общие типы (DTO, агрегаты, контракты UseCase) коннектора Salesforce

pub mod domain;
pub mod usecases;
