//! Builder pattern для сборки контекста
//!
//! Fluent API: сначала правила перехвата, затем бины. Ошибка в pointcut
//! запоминается и возвращается из `build()` до создания контекста.

use std::sync::Arc;

use aspect::{Advice, InterceptionRegistry, MethodPattern, PatternError};
use tracing::debug;

use super::container::{ApplicationContext, Lifetime};
use crate::error::{ContextError, ContextResult};

type PendingRegistration = Box<dyn FnOnce(&ApplicationContext) -> ContextResult<()>>;

pub struct ContextBuilder {
    registry: InterceptionRegistry,
    config_error: Option<PatternError>,
    pending: Vec<PendingRegistration>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            registry: InterceptionRegistry::new(),
            config_error: None,
            pending: Vec::new(),
        }
    }

    /// Before-advice в виде callback без аргументов
    pub fn before<F>(mut self, pointcut: &str, advice: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        if self.config_error.is_none() {
            if let Err(e) = self.registry.register(pointcut, advice) {
                self.config_error = Some(e);
            }
        }
        self
    }

    /// Before-advice, которому нужен контекст вызова
    pub fn aspect<A>(self, pointcut: &str, advice: A) -> Self
    where
        A: Advice + 'static,
    {
        self.aspect_shared(pointcut, Arc::new(advice))
    }

    pub fn aspect_shared(mut self, pointcut: &str, advice: Arc<dyn Advice>) -> Self {
        if self.config_error.is_none() {
            if let Err(e) = self.registry.register_shared(pointcut, advice) {
                self.config_error = Some(e);
            }
        }
        self
    }

    pub fn aspect_pattern(mut self, pattern: MethodPattern, advice: Arc<dyn Advice>) -> Self {
        self.registry.register_pattern(pattern, advice);
        self
    }

    pub fn singleton<T, F>(self, name: &str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.bean(name, factory, Lifetime::Singleton)
    }

    pub fn transient<T, F>(self, name: &str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.bean(name, factory, Lifetime::Transient)
    }

    pub fn bean<T, F>(mut self, name: &str, factory: F, lifetime: Lifetime) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let name = name.to_string();
        self.pending.push(Box::new(move |ctx: &ApplicationContext| {
            ctx.register::<T, F>(&name, factory, lifetime)
        }));
        self
    }

    pub fn on_close<F>(mut self, name: &str, callback: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.to_string();
        self.pending
            .push(Box::new(move |ctx: &ApplicationContext| ctx.on_close(&name, callback)));
        self
    }

    /// Заморозить реестр и создать контекст.
    ///
    /// Ошибка конфигурации возвращается до регистрации первого бина.
    pub fn build(self) -> ContextResult<ApplicationContext> {
        if let Some(e) = self.config_error {
            return Err(ContextError::Configuration(e));
        }

        debug!(rules = self.registry.len(), "freezing interception registry");
        let context = ApplicationContext::new(Arc::new(self.registry));
        for registration in self.pending {
            registration(&context)?;
        }
        Ok(context)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect::{CallDescriptor, Component, MethodSignature};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Repo;

    impl Component for Repo {
        const NAMESPACE: &'static str = "app.dao";
        const TYPE_NAME: &'static str = "Repo";
    }

    impl Repo {
        const SAVE: MethodSignature = MethodSignature::public("save", &[], "void");
    }

    #[test]
    fn test_builder_wires_aspects_before_beans() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();

        let ctx = ContextBuilder::new()
            .before("execution(* app.dao.*.*(..))", move || {
                f.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .singleton("repo", |ctx| Ok(ctx.proxy(Repo)))
            .build()
            .unwrap();

        let repo = ctx.get_bean::<aspect::Proxy<Repo>>("repo").unwrap();
        repo.call(&Repo::SAVE, |_| Ok(())).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.registry().len(), 1);
    }

    #[test]
    fn test_bad_pointcut_fails_build() {
        let created = Arc::new(AtomicUsize::new(0));
        let c = created.clone();

        let result = ContextBuilder::new()
            .before("execution(* app.dao.*.sa?e(..))", || Ok(()))
            .before("execution(* *(..))", || Ok(()))
            .singleton("repo", move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Repo)
            })
            .build();

        assert!(matches!(result, Err(ContextError::Configuration(_))));
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_duplicate_bean_fails_build() {
        let result = ContextBuilder::default()
            .singleton("repo", |_| Ok(Repo))
            .transient("repo", |_| Ok(Repo))
            .build();
        assert!(matches!(result, Err(ContextError::DuplicateBean(_))));
    }

    #[test]
    fn test_aspect_pattern_registration() {
        struct Named;
        impl Advice for Named {
            fn before(&self, _call: &CallDescriptor<'_>) -> anyhow::Result<()> {
                Ok(())
            }
            fn name(&self) -> &str {
                "named"
            }
        }

        let pattern = MethodPattern::builder().named("save").build().unwrap();
        let ctx = ContextBuilder::new()
            .aspect_pattern(pattern, Arc::new(Named))
            .aspect("execution(* app..*.*(..))", Named)
            .build()
            .unwrap();

        let names: Vec<&str> = ctx
            .registry()
            .rules()
            .iter()
            .map(|rule| rule.advice().name())
            .collect();
        assert_eq!(names, vec!["named", "named"]);
    }
}
