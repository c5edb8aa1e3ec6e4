//! Описание вызова, по которому выполняется сопоставление правил

use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;
use crate::proxy::Component;

/// Модификатор доступа метода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            other => Err(PatternError::UnknownVisibility(other.to_string())),
        }
    }
}

/// Static shape of an interceptable method.
///
/// Declared once per method as a `const` next to the component it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub returns: &'static str,
    pub visibility: Visibility,
}

impl MethodSignature {
    pub const fn public(
        name: &'static str,
        params: &'static [&'static str],
        returns: &'static str,
    ) -> Self {
        Self {
            name,
            params,
            returns,
            visibility: Visibility::Public,
        }
    }

    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Runtime description of a single invocation.
///
/// Borrowed from static metadata, so building one per call does not allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDescriptor<'a> {
    namespace: &'a str,
    type_name: &'a str,
    method: &'a str,
    param_types: &'a [&'a str],
    return_type: &'a str,
    visibility: Visibility,
}

impl<'a> CallDescriptor<'a> {
    /// Public `void` method with no parameters; refine with the `with_*` methods.
    pub fn new(namespace: &'a str, type_name: &'a str, method: &'a str) -> Self {
        Self {
            namespace,
            type_name,
            method,
            param_types: &[],
            return_type: "void",
            visibility: Visibility::Public,
        }
    }

    pub fn of<T: Component>(signature: &'a MethodSignature) -> Self {
        Self {
            namespace: T::NAMESPACE,
            type_name: T::TYPE_NAME,
            method: signature.name,
            param_types: signature.params,
            return_type: signature.returns,
            visibility: signature.visibility,
        }
    }

    pub fn with_params(mut self, param_types: &'a [&'a str]) -> Self {
        self.param_types = param_types;
        self
    }

    pub fn with_return_type(mut self, return_type: &'a str) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    pub fn type_name(&self) -> &'a str {
        self.type_name
    }

    pub fn method(&self) -> &'a str {
        self.method
    }

    pub fn param_types(&self) -> &'a [&'a str] {
        self.param_types
    }

    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    pub fn return_type(&self) -> &'a str {
        self.return_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Display for CallDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(
            f,
            "{}.{}({})",
            self.type_name,
            self.method,
            self.param_types.join(", ")
        )
    }
}

/// Приводит синонимы типов к одному имени (`boolean` == `bool`, `()` == `void`)
/// и отбрасывает квалификатор пакета.
pub(crate) fn canonical_type(name: &str) -> &str {
    let simple = name.rsplit('.').next().unwrap_or(name);
    match simple {
        "boolean" => "bool",
        "()" => "void",
        other => other,
    }
}
