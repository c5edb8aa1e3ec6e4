pub mod logging_aspect;

pub use logging_aspect::{LoggingAspect, DEFAULT_MESSAGE};
