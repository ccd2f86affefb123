

use thiserror::Error;


#[derive(Error, Debug)]
pub enum MediqueryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Knowledge store error: {0}")]
    KnowledgeStore(String),

    #[error("Provider store error: {0}")]
    ProviderStore(String),

    #[error("Audit sink error: {0}")]
    Audit(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediqueryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Errors caused by the caller's input rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}


pub type Result<T> = std::result::Result<T, MediqueryError>;
