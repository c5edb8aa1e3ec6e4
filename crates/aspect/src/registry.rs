//! Реестр правил перехвата
//!
//! Правила хранятся в порядке регистрации. Для каждого вызова все подходящие
//! advice выполняются в этом порядке до реального метода. Реестр заполняется
//! при старте и дальше только читается.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::advice::{Advice, AdviceRule};
use crate::descriptor::CallDescriptor;
use crate::error::PatternError;
use crate::pattern::MethodPattern;
use crate::pointcut::parse_pointcut;

thread_local! {
    static IN_ADVICE: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running advice; restores the previous state on drop.
struct AdviceScope {
    previous: bool,
}

impl AdviceScope {
    fn enter() -> Self {
        Self {
            previous: IN_ADVICE.with(|flag| flag.replace(true)),
        }
    }

    fn active() -> bool {
        IN_ADVICE.with(Cell::get)
    }
}

impl Drop for AdviceScope {
    fn drop(&mut self) {
        IN_ADVICE.with(|flag| flag.set(self.previous));
    }
}

#[derive(Default)]
pub struct InterceptionRegistry {
    rules: Vec<AdviceRule>,
    fired: AtomicUsize,
}

impl InterceptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать advice (callback без аргументов) для pointcut выражения.
    ///
    /// Некорректное выражение отклоняется сразу, правило не добавляется.
    pub fn register<F>(&mut self, pointcut: &str, advice: F) -> Result<&AdviceRule, PatternError>
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_shared(pointcut, Arc::new(advice))
    }

    /// Register an [`Advice`] implementation that needs the call context.
    pub fn register_advice<A>(&mut self, pointcut: &str, advice: A) -> Result<&AdviceRule, PatternError>
    where
        A: Advice + 'static,
    {
        self.register_shared(pointcut, Arc::new(advice))
    }

    /// Same as [`register_advice`](Self::register_advice) for advice shared between several rules.
    pub fn register_shared(
        &mut self,
        pointcut: &str,
        advice: Arc<dyn Advice>,
    ) -> Result<&AdviceRule, PatternError> {
        let pattern = parse_pointcut(pointcut).map_err(|err| {
            debug!(pointcut, error = %err, "rejected pointcut");
            err
        })?;
        Ok(self.register_pattern(pattern, advice))
    }

    /// Append a rule built from an already validated pattern.
    pub fn register_pattern(&mut self, pattern: MethodPattern, advice: Arc<dyn Advice>) -> &AdviceRule {
        let order = self.rules.len();
        debug!(
            order,
            pattern = %pattern,
            advice = advice.name(),
            "registered advice rule"
        );
        self.rules.push(AdviceRule::new(pattern, advice, order));
        &self.rules[order]
    }

    pub fn rules(&self) -> &[AdviceRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose pattern matches `call`, in registration order.
    pub fn matching<'r>(
        &'r self,
        call: &'r CallDescriptor<'r>,
    ) -> impl Iterator<Item = &'r AdviceRule> + 'r {
        self.rules.iter().filter(move |rule| rule.matches(call))
    }

    /// Total advice bodies completed through this registry.
    pub fn advice_invocations(&self) -> usize {
        self.fired.load(Ordering::Relaxed)
    }

    /// Run matching advice, then the real method.
    ///
    /// The first failing advice aborts the call. Errors from advice or from
    /// `real` are returned as-is. Calls made from inside an advice body on the
    /// same thread skip advice entirely.
    pub fn invoke<T, F>(&self, call: &CallDescriptor<'_>, real: F) -> anyhow::Result<T>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        if AdviceScope::active() {
            trace!(call = %call, "nested call from advice, skipping interception");
            return real();
        }

        let mut fired = 0usize;
        for rule in self.matching(call) {
            debug!(
                rule = rule.order(),
                advice = rule.advice().name(),
                call = %call,
                "running before advice"
            );
            {
                let _scope = AdviceScope::enter();
                rule.advice().before(call)?;
            }
            fired += 1;
            self.fired.fetch_add(1, Ordering::Relaxed);
        }

        if fired == 0 {
            trace!(call = %call, "no advice matched");
        }

        real()
    }
}

impl std::fmt::Debug for InterceptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptionRegistry")
            .field("rules", &self.rules)
            .field("fired", &self.advice_invocations())
            .finish()
    }
}
