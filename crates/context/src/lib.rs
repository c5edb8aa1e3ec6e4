//! Явный контекст приложения вместо контейнера с автоматическим сканированием
//!
//! - Бины регистрируются по имени и извлекаются по имени и типу
//! - Правила перехвата регистрируются до создания первого бина
//! - `close()` освобождает ресурсы детерминированно, `Drop` страхует остальные пути выхода

pub mod builder;
pub mod config;
pub mod container;
pub mod error;

pub use builder::ContextBuilder;
pub use config::{AppConfig, AspectConfig, ConfigError, DEFAULT_POINTCUT};
pub use container::{ApplicationContext, Lifetime};
pub use error::ContextError;

/// Основной API для создания контекста
pub fn create_context() -> ContextBuilder {
    ContextBuilder::new()
}
