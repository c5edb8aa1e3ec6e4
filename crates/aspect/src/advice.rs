use std::fmt;
use std::sync::Arc;

use crate::descriptor::CallDescriptor;
use crate::pattern::MethodPattern;

/// Before-advice body.
///
/// Runs for side effects only. Returning an error aborts the intercepted call:
/// the remaining advice and the real method are skipped and the error reaches
/// the caller unchanged.
///
/// Zero-argument closures `Fn() -> anyhow::Result<()>` implement this trait
/// directly; types that need the call context implement [`Advice::before`].
pub trait Advice: Send + Sync {
    fn before(&self, call: &CallDescriptor<'_>) -> anyhow::Result<()>;

    /// Имя для логов
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> Advice for F
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn before(&self, _call: &CallDescriptor<'_>) -> anyhow::Result<()> {
        self()
    }
}

/// Правило: pattern + advice. Не изменяется после регистрации.
pub struct AdviceRule {
    pattern: MethodPattern,
    advice: Arc<dyn Advice>,
    order: usize,
}

impl AdviceRule {
    pub(crate) fn new(pattern: MethodPattern, advice: Arc<dyn Advice>, order: usize) -> Self {
        Self {
            pattern,
            advice,
            order,
        }
    }

    pub fn pattern(&self) -> &MethodPattern {
        &self.pattern
    }

    pub fn advice(&self) -> &dyn Advice {
        self.advice.as_ref()
    }

    /// Position in registration order, starting at 0.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn matches(&self, call: &CallDescriptor<'_>) -> bool {
        self.pattern.matches(call)
    }
}

impl fmt::Debug for AdviceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceRule")
            .field("order", &self.order)
            .field("pattern", &self.pattern.to_string())
            .field("advice", &self.advice.name())
            .finish()
    }
}
