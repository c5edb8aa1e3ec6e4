//! Разбор pointcut выражений
//!
//! Поддерживается один designator:
//!
//! ```text
//! execution([visibility] <return> [<namespace>.<Type>.]<name>(<params>))
//! ```
//!
//! Примеры: `execution(* aopdemo.dao.*.*(..))`, `execution(public void add*())`,
//! `execution(bool aopdemo..AccountDao.doWork())`.

use crate::descriptor::Visibility;
use crate::error::PatternError;
use crate::pattern::{
    DeclaringTypePattern, MethodPattern, NamePattern, NamespacePattern, ParamPattern,
    ReturnPattern,
};

const DESIGNATOR: &str = "execution";

/// Parse a pointcut expression into a [`MethodPattern`].
///
/// Single left-to-right scan; any deviation from the grammar is reported as a
/// [`PatternError`] carrying the original expression.
pub fn parse_pointcut(expression: &str) -> Result<MethodPattern, PatternError> {
    let src = expression.trim();
    if src.is_empty() {
        return Err(PatternError::Empty);
    }

    let open = src
        .find('(')
        .ok_or_else(|| PatternError::syntax(expression, "expected '(' after designator"))?;
    let designator = src[..open].trim();
    if designator != DESIGNATOR {
        return Err(PatternError::UnknownDesignator {
            expression: expression.to_string(),
            designator: designator.to_string(),
        });
    }

    let body = src[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| PatternError::syntax(expression, "expected closing ')'"))?;

    let params_open = body
        .find('(')
        .ok_or_else(|| PatternError::syntax(expression, "missing parameter list"))?;
    let params_close = body
        .rfind(')')
        .filter(|close| *close > params_open)
        .ok_or_else(|| PatternError::syntax(expression, "unbalanced parentheses"))?;

    let params_text = &body[params_open + 1..params_close];
    if params_text.contains(['(', ')']) {
        return Err(PatternError::syntax(expression, "unbalanced parentheses"));
    }
    if !body[params_close + 1..].trim().is_empty() {
        return Err(PatternError::syntax(
            expression,
            "unexpected text after parameter list",
        ));
    }

    let wrap = |err| PatternError::in_expression(expression, err);

    let mut tokens = body[..params_open].split_whitespace().peekable();
    let visibility = match tokens.peek() {
        Some(&token) if is_visibility_keyword(token) => {
            tokens.next();
            Some(token.parse::<Visibility>().map_err(wrap)?)
        }
        _ => None,
    };

    let tokens: Vec<&str> = tokens.collect();
    let (return_token, qualified) = match tokens.as_slice() {
        [ret, qualified] => (*ret, *qualified),
        [] => return Err(PatternError::syntax(expression, "missing method name")),
        [_] => return Err(PatternError::syntax(expression, "missing return type")),
        [_, _, extra, ..] => {
            return Err(PatternError::syntax(
                expression,
                format!("unexpected token '{}'", extra),
            ))
        }
    };

    let returns = ReturnPattern::parse(return_token).map_err(wrap)?;
    let (declaring, name) = split_qualified(expression, qualified)?;
    let params = ParamPattern::parse(params_text).map_err(wrap)?;

    Ok(MethodPattern {
        visibility,
        returns,
        declaring,
        name,
        params,
    })
}

fn is_visibility_keyword(token: &str) -> bool {
    matches!(token, "public" | "protected" | "private")
}

// `a.b.Type.name`, `a.b..Type.name`, `Type.name` или просто `name`
fn split_qualified(
    expression: &str,
    qualified: &str,
) -> Result<(DeclaringTypePattern, NamePattern), PatternError> {
    let wrap = |err| PatternError::in_expression(expression, err);

    let Some(dot) = qualified.rfind('.') else {
        let name = NamePattern::parse(qualified, "method name").map_err(wrap)?;
        return Ok((DeclaringTypePattern::any(), name));
    };

    let declaring = &qualified[..dot];
    let name = NamePattern::parse(&qualified[dot + 1..], "method name").map_err(wrap)?;
    if declaring.is_empty() || declaring.ends_with('.') {
        return Err(PatternError::syntax(
            expression,
            "expected '<Type>.<method>' in qualified name",
        ));
    }

    let (namespace, type_token) = match declaring.rfind('.') {
        None => (NamespacePattern::Any, declaring),
        Some(0) => return Err(PatternError::syntax(expression, "empty namespace")),
        Some(d) => {
            // `a.b..Type`: точка перед `..` остается в тексте namespace
            let ns_text = if declaring[..d].ends_with('.') {
                &declaring[..=d]
            } else {
                &declaring[..d]
            };
            (NamespacePattern::parse(ns_text).map_err(wrap)?, &declaring[d + 1..])
        }
    };

    let type_name = NamePattern::parse(type_token, "type").map_err(wrap)?;
    Ok((
        DeclaringTypePattern {
            namespace,
            type_name,
        },
        name,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CallDescriptor;

    fn account_add() -> CallDescriptor<'static> {
        CallDescriptor::new("aopdemo.dao", "AccountDao", "addAccount").with_params(&["Account", "bool"])
    }

    fn membership_add() -> CallDescriptor<'static> {
        CallDescriptor::new("aopdemo.dao", "MembershipDao", "addAccount")
    }

    fn do_work() -> CallDescriptor<'static> {
        CallDescriptor::new("aopdemo.dao", "AccountDao", "doWork").with_return_type("bool")
    }

    #[test]
    fn test_package_wide_pointcut() {
        let pattern = parse_pointcut("execution(*  aopdemo.dao.*.*( ..))").unwrap();
        assert!(pattern.matches(&account_add()));
        assert!(pattern.matches(&membership_add()));
        assert!(pattern.matches(&do_work()));
        assert!(!pattern.matches(&CallDescriptor::new("aopdemo", "MainApp", "main")));
        assert!(!pattern.matches(&CallDescriptor::new("aopdemo.daoextra", "Other", "addAccount")));
    }

    #[test]
    fn test_short_form_with_visibility() {
        let pattern = parse_pointcut("execution(public void add*())").unwrap();
        assert_eq!(pattern.visibility, Some(Visibility::Public));
        assert!(pattern.matches(&membership_add()));
        assert!(!pattern.matches(&account_add()), "arity differs");
        assert!(!pattern.matches(&do_work()));

        let without = parse_pointcut("execution(void add*())").unwrap();
        assert!(without.matches(&membership_add()));
        assert!(!without.matches(&account_add()));
    }

    #[test]
    fn test_declaring_type_forms() {
        let exact = parse_pointcut("execution(bool aopdemo.dao.AccountDao.doWork())").unwrap();
        assert!(exact.matches(&do_work()));
        assert!(!exact.matches(&membership_add()));

        let within = parse_pointcut("execution(* aopdemo..*.*(..))").unwrap();
        assert!(within.matches(&account_add()));
        assert!(within.matches(&CallDescriptor::new("aopdemo", "MainApp", "main")));
        assert!(!within.matches(&CallDescriptor::new("other", "MainApp", "main")));

        let type_only = parse_pointcut("execution(* MembershipDao.*(..))").unwrap();
        assert!(type_only.matches(&membership_add()));
        assert!(!type_only.matches(&account_add()));
    }

    #[test]
    fn test_typed_parameters() {
        let pattern = parse_pointcut("execution(* add*(Account, boolean))").unwrap();
        assert!(pattern.matches(&account_add()));
        assert!(!pattern.matches(&membership_add()));
    }

    #[test]
    fn test_display_round_trip() {
        for expr in [
            "execution(* aopdemo.dao.*.*(..))",
            "execution(public void add*())",
            "execution(bool aopdemo..AccountDao.doWork())",
        ] {
            let pattern = parse_pointcut(expr).unwrap();
            assert_eq!(pattern.to_string(), expr);
            assert_eq!(parse_pointcut(&pattern.to_string()).unwrap(), pattern);
        }
    }

    #[test]
    fn test_rejects_malformed_expressions() {
        assert_eq!(parse_pointcut("   "), Err(PatternError::Empty));
        assert!(matches!(
            parse_pointcut("within(aopdemo.dao.*)"),
            Err(PatternError::UnknownDesignator { designator, .. }) if designator == "within"
        ));
        assert!(matches!(
            parse_pointcut("execution(* add*()"),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            parse_pointcut("execution(* add*)"),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            parse_pointcut("execution(add*())"),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            parse_pointcut("execution(public static void add*())"),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            parse_pointcut("execution(* aopdemo.dao..add*())"),
            Err(PatternError::Syntax { .. })
        ));
        assert!(matches!(
            parse_pointcut("execution(* add*() extra)"),
            Err(PatternError::Syntax { .. })
        ));
    }

    #[test]
    fn test_component_errors_carry_expression() {
        let err = parse_pointcut("execution(* aopdemo.dao.*.a*b(..))").unwrap_err();
        match err {
            PatternError::InExpression { expression, source } => {
                assert_eq!(expression, "execution(* aopdemo.dao.*.a*b(..))");
                assert!(matches!(*source, PatternError::UnrecognizedWildcard { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(parse_pointcut("execution(* aopdemo.d?o.*.*(..))").is_err());
    }
}
