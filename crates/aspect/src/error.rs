use thiserror::Error;

/// Ошибка конфигурации pointcut правила.
///
/// Возникает только при регистрации, никогда во время вызова.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pointcut expression is empty")]
    Empty,

    #[error("empty {component} pattern")]
    EmptyComponent { component: &'static str },

    #[error("unrecognized wildcard token '{token}' in {component} pattern")]
    UnrecognizedWildcard {
        component: &'static str,
        token: String,
    },

    #[error("invalid identifier '{token}' in {component} pattern")]
    InvalidIdentifier {
        component: &'static str,
        token: String,
    },

    #[error("unknown visibility modifier '{0}'")]
    UnknownVisibility(String),

    #[error("unsupported pointcut designator '{designator}' in '{expression}'")]
    UnknownDesignator {
        expression: String,
        designator: String,
    },

    #[error("malformed pointcut '{expression}': {reason}")]
    Syntax { expression: String, reason: String },

    #[error("invalid pointcut '{expression}': {source}")]
    InExpression {
        expression: String,
        #[source]
        source: Box<PatternError>,
    },
}

impl PatternError {
    pub(crate) fn syntax(expression: &str, reason: impl Into<String>) -> Self {
        PatternError::Syntax {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn in_expression(expression: &str, source: PatternError) -> Self {
        PatternError::InExpression {
            expression: expression.to_string(),
            source: Box::new(source),
        }
    }
}
