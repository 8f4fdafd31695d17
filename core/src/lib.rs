//! Personas Core Library
//!
//! This crate provides the client-side core of the Personas application: the configuration
//! provider, the authenticated request pipeline with its error translator, the session cache of
//! Persona records, and the form validation rules applied before anything is submitted.

pub mod api;
pub mod cache;
pub mod logging;
pub mod models;
pub mod service;
pub mod settings;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use api::*;
pub use cache::*;
pub use logging::*;
pub use models::persona::*;
pub use service::*;
pub use settings::*;
pub use storage::repository::*;
pub use validation::*;

/// Personas-specific result type
pub type PersonaResult<T> = std::result::Result<T, PersonaError>;

/// Core error type for the Personas client
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    /// A remote call failed; the message is already translated for display.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PersonaError {
    /// The translated API failure, when this error came from the remote service.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            PersonaError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the remote service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }
}

impl From<::config::ConfigError> for PersonaError {
    fn from(err: ::config::ConfigError) -> Self {
        PersonaError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(err: serde_json::Error) -> Self {
        PersonaError::InvalidInput(err.to_string())
    }
}
