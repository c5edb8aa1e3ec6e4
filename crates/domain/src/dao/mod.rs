//! Слой доступа к данным. Каждый DAO описывает свои методы через `MethodSignature`,
//! а proxy реализует тот же trait, поэтому вызывающий код не видит перехвата.

pub mod account_dao;
pub mod membership_dao;

pub use account_dao::{AccountDao, AccountOperations};
pub use membership_dao::{MembershipDao, MembershipOperations};

/// Логический пакет всех DAO
pub const DAO_NAMESPACE: &str = "aopdemo.dao";
