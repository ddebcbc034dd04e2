use thiserror::Error;

/// Ошибки коннектора
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Не удалось разрешить обязательную ссылку при маппинге
    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Salesforce API error: {0}")]
    Api(String),

    #[error("ERP error: {0}")]
    Erp(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConnectorError {
    pub fn mapping(message: impl Into<String>) -> Self {
        ConnectorError::Mapping(message.into())
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConnectorError::Mapping(_))
    }
}
