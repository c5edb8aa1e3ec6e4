//! Method patterns: a declarative matcher over (namespace, type, name, parameters).
//!
//! A pattern matches a call only when every component matches. Matching is a
//! single pass over segments and characters; there is no regex and no
//! backtracking.

use std::fmt;

use crate::descriptor::{canonical_type, CallDescriptor, Visibility};
use crate::error::PatternError;

const WILDCARD: &str = "*";
const ANY_PARAMS: &str = "..";

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Имя типа или метода: `*`, точное имя, либо префикс `add*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Any,
    Exact(String),
    Prefix(String),
}

impl NamePattern {
    pub fn parse(token: &str, component: &'static str) -> Result<Self, PatternError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PatternError::EmptyComponent { component });
        }
        if token == WILDCARD {
            return Ok(NamePattern::Any);
        }

        match token.find('*') {
            None if is_identifier(token) => Ok(NamePattern::Exact(token.to_string())),
            None => Err(classify_bad_token(token, component)),
            Some(pos) if pos == token.len() - 1 && is_identifier(&token[..pos]) => {
                Ok(NamePattern::Prefix(token[..pos].to_string()))
            }
            Some(_) => Err(PatternError::UnrecognizedWildcard {
                component,
                token: token.to_string(),
            }),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Any => true,
            NamePattern::Exact(exact) => exact == name,
            NamePattern::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, NamePattern::Any)
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Any => f.write_str(WILDCARD),
            NamePattern::Exact(name) => f.write_str(name),
            NamePattern::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}

// Символы, которые похожи на wildcard, сообщаем отдельно от опечаток в идентификаторах.
fn classify_bad_token(token: &str, component: &'static str) -> PatternError {
    if token.contains(['?', '+', '%', '#', '[', ']', '{', '}', '|', '^']) {
        PatternError::UnrecognizedWildcard {
            component,
            token: token.to_string(),
        }
    } else {
        PatternError::InvalidIdentifier {
            component,
            token: token.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Any,
    Exact(String),
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(exact) => exact == segment,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Any => f.write_str(WILDCARD),
            Segment::Exact(s) => f.write_str(s),
        }
    }
}

/// Namespace matcher, compared segment by segment.
///
/// `a.b` matches exactly the namespace `a.b`; `a.b..` also matches every
/// namespace nested under it. A `*` segment matches exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacePattern {
    Any,
    Exact(Vec<Segment>),
    Within(Vec<Segment>),
}

impl NamespacePattern {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        if text.is_empty() || text == ANY_PARAMS {
            return Ok(NamespacePattern::Any);
        }

        let (body, within) = match text.strip_suffix(ANY_PARAMS) {
            Some(body) => (body, true),
            None => (text, false),
        };

        let segments = body
            .split('.')
            .map(|segment| match segment {
                WILDCARD => Ok(Segment::Any),
                s if is_identifier(s) => Ok(Segment::Exact(s.to_string())),
                "" => Err(PatternError::InvalidIdentifier {
                    component: "namespace",
                    token: text.to_string(),
                }),
                s if s.contains('*') => Err(PatternError::UnrecognizedWildcard {
                    component: "namespace",
                    token: s.to_string(),
                }),
                s => Err(classify_bad_token(s, "namespace")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if within {
            NamespacePattern::Within(segments)
        } else {
            NamespacePattern::Exact(segments)
        })
    }

    pub fn matches(&self, namespace: &str) -> bool {
        let segments = || namespace.split('.').filter(|s| !s.is_empty());
        match self {
            NamespacePattern::Any => true,
            NamespacePattern::Exact(expected) => {
                segments().count() == expected.len()
                    && expected.iter().zip(segments()).all(|(p, s)| p.matches(s))
            }
            NamespacePattern::Within(prefix) => {
                segments().count() >= prefix.len()
                    && prefix.iter().zip(segments()).all(|(p, s)| p.matches(s))
            }
        }
    }
}

impl fmt::Display for NamespacePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |segments: &[Segment]| {
            segments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".")
        };
        match self {
            NamespacePattern::Any => Ok(()),
            NamespacePattern::Exact(segments) => write!(f, "{}.", join(segments)),
            NamespacePattern::Within(segments) => write!(f, "{}..", join(segments)),
        }
    }
}

/// Declaring type: namespace plus type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaringTypePattern {
    pub namespace: NamespacePattern,
    pub type_name: NamePattern,
}

impl DeclaringTypePattern {
    pub fn any() -> Self {
        Self {
            namespace: NamespacePattern::Any,
            type_name: NamePattern::Any,
        }
    }

    pub fn is_any(&self) -> bool {
        self.namespace == NamespacePattern::Any && self.type_name.is_any()
    }

    pub fn matches(&self, call: &CallDescriptor<'_>) -> bool {
        self.namespace.matches(call.namespace()) && self.type_name.matches(call.type_name())
    }
}

/// Тип возвращаемого значения
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnPattern {
    Any,
    Exact(String),
}

impl ReturnPattern {
    pub fn parse(token: &str) -> Result<Self, PatternError> {
        let token = token.trim();
        match token {
            "" => Err(PatternError::EmptyComponent {
                component: "return type",
            }),
            WILDCARD => Ok(ReturnPattern::Any),
            t if t.contains('*') => Err(PatternError::UnrecognizedWildcard {
                component: "return type",
                token: t.to_string(),
            }),
            t if t.split('.').all(is_identifier) || t == "()" => {
                Ok(ReturnPattern::Exact(canonical_type(t).to_string()))
            }
            t => Err(classify_bad_token(t, "return type")),
        }
    }

    pub fn matches(&self, return_type: &str) -> bool {
        match self {
            ReturnPattern::Any => true,
            ReturnPattern::Exact(expected) => expected == canonical_type(return_type),
        }
    }
}

impl fmt::Display for ReturnPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnPattern::Any => f.write_str(WILDCARD),
            ReturnPattern::Exact(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Exact(String),
}

/// Parameter list: `..` for any arity, otherwise one entry per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamPattern {
    Any,
    List(Vec<ParamType>),
}

impl ParamPattern {
    /// Разбирает содержимое скобок (без самих скобок)
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        if text == ANY_PARAMS {
            return Ok(ParamPattern::Any);
        }
        if text.is_empty() {
            return Ok(ParamPattern::List(Vec::new()));
        }

        text.split(',')
            .map(|param| match param.trim() {
                "" => Err(PatternError::EmptyComponent {
                    component: "parameter",
                }),
                WILDCARD => Ok(ParamType::Any),
                ANY_PARAMS => Err(PatternError::UnrecognizedWildcard {
                    component: "parameter",
                    token: text.to_string(),
                }),
                p if p.contains('*') => Err(PatternError::UnrecognizedWildcard {
                    component: "parameter",
                    token: p.to_string(),
                }),
                p if p.split('.').all(is_identifier) => {
                    Ok(ParamType::Exact(canonical_type(p).to_string()))
                }
                p => Err(classify_bad_token(p, "parameter")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ParamPattern::List)
    }

    pub fn arity(count: usize) -> Self {
        ParamPattern::List(vec![ParamType::Any; count])
    }

    pub fn matches(&self, param_types: &[&str]) -> bool {
        match self {
            ParamPattern::Any => true,
            ParamPattern::List(expected) => {
                expected.len() == param_types.len()
                    && expected.iter().zip(param_types).all(|(p, actual)| match p {
                        ParamType::Any => true,
                        ParamType::Exact(name) => name == canonical_type(actual),
                    })
            }
        }
    }
}

impl fmt::Display for ParamPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPattern::Any => f.write_str(ANY_PARAMS),
            ParamPattern::List(params) => {
                let rendered: Vec<&str> = params
                    .iter()
                    .map(|p| match p {
                        ParamType::Any => WILDCARD,
                        ParamType::Exact(name) => name.as_str(),
                    })
                    .collect();
                f.write_str(&rendered.join(", "))
            }
        }
    }
}

/// Complete method matcher. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPattern {
    pub visibility: Option<Visibility>,
    pub returns: ReturnPattern,
    pub declaring: DeclaringTypePattern,
    pub name: NamePattern,
    pub params: ParamPattern,
}

impl MethodPattern {
    pub fn builder() -> MethodPatternBuilder {
        MethodPatternBuilder::default()
    }

    /// Matches every method of every type.
    pub fn any() -> Self {
        Self {
            visibility: None,
            returns: ReturnPattern::Any,
            declaring: DeclaringTypePattern::any(),
            name: NamePattern::Any,
            params: ParamPattern::Any,
        }
    }

    pub fn matches(&self, call: &CallDescriptor<'_>) -> bool {
        self.visibility.map_or(true, |v| v == call.visibility())
            && self.returns.matches(call.return_type())
            && self.declaring.matches(call)
            && self.name.matches(call.method())
            && self.params.matches(call.param_types())
    }
}

impl fmt::Display for MethodPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("execution(")?;
        if let Some(visibility) = self.visibility {
            write!(f, "{} ", visibility)?;
        }
        write!(f, "{} ", self.returns)?;
        if !self.declaring.is_any() {
            write!(
                f,
                "{}{}.",
                self.declaring.namespace, self.declaring.type_name
            )?;
        }
        write!(f, "{}({}))", self.name, self.params)
    }
}

/// Typed construction of a [`MethodPattern`].
///
/// Components are kept as raw tokens and validated together in [`build`],
/// so a malformed token surfaces as a [`PatternError`] at registration time.
///
/// [`build`]: MethodPatternBuilder::build
#[derive(Debug, Clone, Default)]
pub struct MethodPatternBuilder {
    visibility: Option<Visibility>,
    returns: Option<String>,
    namespace: Option<String>,
    type_name: Option<String>,
    name: Option<String>,
    params: Option<String>,
}

impl MethodPatternBuilder {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.returns = Some(return_type.into());
        self
    }

    /// Types declared directly in `namespace`.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Types declared in `namespace` or any namespace nested under it.
    pub fn within_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(format!("{}{}", namespace.into(), ANY_PARAMS));
        self
    }

    pub fn type_named(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn any_type(mut self) -> Self {
        self.type_name = None;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name = Some(format!("{}{}", prefix.into(), WILDCARD));
        self
    }

    pub fn any_name(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn arity(mut self, count: usize) -> Self {
        self.params = Some(vec![WILDCARD; count].join(","));
        self
    }

    pub fn params(mut self, types: &[&str]) -> Self {
        self.params = Some(types.join(","));
        self
    }

    pub fn any_arity(mut self) -> Self {
        self.params = None;
        self
    }

    pub fn build(self) -> Result<MethodPattern, PatternError> {
        let namespace = match self.namespace.as_deref() {
            Some(ns) => NamespacePattern::parse(ns)?,
            None => NamespacePattern::Any,
        };
        let type_name = match self.type_name.as_deref() {
            Some(t) => NamePattern::parse(t, "type")?,
            None => NamePattern::Any,
        };
        let name = match self.name.as_deref() {
            Some(n) => NamePattern::parse(n, "method name")?,
            None => NamePattern::Any,
        };
        let returns = match self.returns.as_deref() {
            Some(r) => ReturnPattern::parse(r)?,
            None => ReturnPattern::Any,
        };
        let params = match self.params.as_deref() {
            Some(p) => ParamPattern::parse(p)?,
            None => ParamPattern::Any,
        };

        Ok(MethodPattern {
            visibility: self.visibility,
            returns,
            declaring: DeclaringTypePattern {
                namespace,
                type_name,
            },
            name,
            params,
        })
    }
}
