use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid scenario: {reason}")]
    InvalidScenario { reason: String },

    #[error("Pass length mismatch: expected {expected} cells, got {actual}")]
    PassLengthMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

impl DomainError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        DomainError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_scenario(reason: impl Into<String>) -> Self {
        DomainError::InvalidScenario { reason: reason.into() }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
