//! Domain Layer - объекты, через которые демо проводит вызовы
//!
//! - Entities: Account
//! - DAO: AccountDao, MembershipDao (namespace `aopdemo.dao`) и их proxy
//! - Aspects: LoggingAspect, before-advice для слоя доступа к данным
//! - Console: куда DAO и advice пишут свои строки

pub mod aspects;
pub mod console;
pub mod dao;
pub mod entities;
pub mod errors;

pub use aspects::{LoggingAspect, DEFAULT_MESSAGE};
pub use console::{ConsoleSink, RecordingSink, StdoutSink};
pub use dao::{AccountDao, AccountOperations, MembershipDao, MembershipOperations, DAO_NAMESPACE};
pub use entities::Account;
pub use errors::DaoError;
