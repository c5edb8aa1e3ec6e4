//! Перехват вызовов методов по декларативным pointcut правилам
//!
//! Основные части:
//! - [`MethodPattern`] - сопоставление (namespace, тип, имя, параметры)
//! - [`parse_pointcut`] - разбор выражений вида `execution(* app.dao.*.*(..))`
//! - [`InterceptionRegistry`] - упорядоченный набор правил и `invoke`
//! - [`Proxy`] - обертка компонента, направляющая вызовы через реестр

pub mod advice;
pub mod descriptor;
pub mod error;
pub mod pattern;
pub mod pointcut;
pub mod proxy;
pub mod registry;

pub use advice::{Advice, AdviceRule};
pub use descriptor::{CallDescriptor, MethodSignature, Visibility};
pub use error::PatternError;
pub use pattern::{
    DeclaringTypePattern, MethodPattern, MethodPatternBuilder, NamePattern, NamespacePattern,
    ParamPattern, ParamType, ReturnPattern, Segment,
};
pub use pointcut::parse_pointcut;
pub use proxy::{Component, Proxy};
pub use registry::InterceptionRegistry;
