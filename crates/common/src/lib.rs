pub mod structured_logging;

pub use structured_logging::{
    init_logging,
    JsonFormatter,
    LogFormat,
    LogFormatError,
    LoggingConfig,
    OperationTimer,
    StructuredLogEntry,
    ExecutionContext,
};
