use serde::{Deserialize, Serialize};
use std::fmt;

/// Учетная запись, которую демо передает в `AccountDao::add_account`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub level: String,
}

impl Account {
    pub fn new(name: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: level.into(),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account [name={}, level={}]", self.name, self.level)
    }
}
