use thiserror::Error;

/// Ошибки реальных методов DAO
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaoError {
    #[error("{component}.{method} failed: {message}")]
    InvocationFailed {
        component: &'static str,
        method: &'static str,
        message: String,
    },

    #[error("console output failed: {0}")]
    Console(String),
}

impl From<std::io::Error> for DaoError {
    fn from(err: std::io::Error) -> Self {
        DaoError::Console(err.to_string())
    }
}
