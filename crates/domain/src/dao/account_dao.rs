use std::fmt;
use std::sync::Arc;

use aspect::{Component, MethodSignature, Proxy};
use tracing::trace;

use super::DAO_NAMESPACE;
use crate::console::ConsoleSink;
use crate::entities::Account;
use crate::errors::DaoError;

pub trait AccountOperations {
    fn add_account(&self, account: &Account, vip: bool) -> anyhow::Result<()>;
    fn do_work(&self) -> anyhow::Result<bool>;
}

pub struct AccountDao {
    console: Arc<dyn ConsoleSink>,
    failure: Option<String>,
}

impl AccountDao {
    pub const ADD_ACCOUNT: MethodSignature =
        MethodSignature::public("addAccount", &["Account", "bool"], "void");
    pub const DO_WORK: MethodSignature = MethodSignature::public("doWork", &[], "bool");

    pub fn new(console: Arc<dyn ConsoleSink>) -> Self {
        Self {
            console,
            failure: None,
        }
    }

    /// Экземпляр, у которого каждый метод завершается ошибкой `message`
    pub fn failing(console: Arc<dyn ConsoleSink>, message: impl Into<String>) -> Self {
        Self {
            console,
            failure: Some(message.into()),
        }
    }

    fn check(&self, signature: &MethodSignature) -> Result<(), DaoError> {
        match &self.failure {
            Some(message) => Err(DaoError::InvocationFailed {
                component: Self::TYPE_NAME,
                method: signature.name,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn print(&self, text: &str) -> Result<(), DaoError> {
        self.console
            .print_line(&format!("{}: {}", Self::TYPE_NAME, text))?;
        Ok(())
    }
}

impl Component for AccountDao {
    const NAMESPACE: &'static str = DAO_NAMESPACE;
    const TYPE_NAME: &'static str = "AccountDao";
}

impl AccountOperations for AccountDao {
    fn add_account(&self, account: &Account, vip: bool) -> anyhow::Result<()> {
        self.check(&Self::ADD_ACCOUNT)?;
        trace!(account = %account, vip, "adding account");
        self.print("DOING MY DB WORK: ADDING AN ACCOUNT")?;
        Ok(())
    }

    fn do_work(&self) -> anyhow::Result<bool> {
        self.check(&Self::DO_WORK)?;
        self.print("doWork()")?;
        Ok(false)
    }
}

impl AccountOperations for Proxy<AccountDao> {
    fn add_account(&self, account: &Account, vip: bool) -> anyhow::Result<()> {
        self.call(&AccountDao::ADD_ACCOUNT, |dao| dao.add_account(account, vip))
    }

    fn do_work(&self) -> anyhow::Result<bool> {
        self.call(&AccountDao::DO_WORK, AccountDao::do_work)
    }
}

impl fmt::Debug for AccountDao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDao")
            .field("failing", &self.failure.is_some())
            .finish()
    }
}
