use aspect::PatternError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("configuration error: {0}")]
    Configuration(#[from] PatternError),

    #[error("no bean named '{0}' is registered")]
    NoSuchBean(String),

    #[error("bean '{name}' is a {actual}, not a {expected}")]
    BeanTypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("bean '{0}' is already registered")]
    DuplicateBean(String),

    #[error("circular reference while creating bean '{0}'")]
    CircularReference(String),

    #[error("failed to create bean '{name}': {source}")]
    BeanCreation {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("application context is closed")]
    Closed,
}

pub type ContextResult<T> = Result<T, ContextError>;
