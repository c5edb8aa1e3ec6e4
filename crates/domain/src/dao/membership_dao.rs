use std::sync::Arc;

use aspect::{Component, MethodSignature, Proxy};

use super::DAO_NAMESPACE;
use crate::console::ConsoleSink;
use crate::errors::DaoError;

pub trait MembershipOperations {
    fn add_account(&self) -> anyhow::Result<()>;
    fn go_to_sleep(&self) -> anyhow::Result<()>;
}

pub struct MembershipDao {
    console: Arc<dyn ConsoleSink>,
}

impl MembershipDao {
    pub const ADD_ACCOUNT: MethodSignature = MethodSignature::public("addAccount", &[], "void");
    pub const GO_TO_SLEEP: MethodSignature = MethodSignature::public("goToSleep", &[], "void");

    pub fn new(console: Arc<dyn ConsoleSink>) -> Self {
        Self { console }
    }

    fn print(&self, text: &str) -> Result<(), DaoError> {
        self.console
            .print_line(&format!("{}: {}", Self::TYPE_NAME, text))?;
        Ok(())
    }
}

impl Component for MembershipDao {
    const NAMESPACE: &'static str = DAO_NAMESPACE;
    const TYPE_NAME: &'static str = "MembershipDao";
}

impl MembershipOperations for MembershipDao {
    fn add_account(&self) -> anyhow::Result<()> {
        self.print("DOING STUFF: ADDING A MEMBERSHIP ACCOUNT")?;
        Ok(())
    }

    fn go_to_sleep(&self) -> anyhow::Result<()> {
        self.print("I'm going to sleep now...")?;
        Ok(())
    }
}

impl MembershipOperations for Proxy<MembershipDao> {
    fn add_account(&self) -> anyhow::Result<()> {
        self.call(&MembershipDao::ADD_ACCOUNT, MembershipDao::add_account)
    }

    fn go_to_sleep(&self) -> anyhow::Result<()> {
        self.call(&MembershipDao::GO_TO_SLEEP, MembershipDao::go_to_sleep)
    }
}

impl std::fmt::Debug for MembershipDao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MembershipDao")
    }
}
