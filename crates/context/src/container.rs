//! Контекст приложения: именованные бины + замороженный реестр перехвата
//!
//! АРХИТЕКТУРНЫЕ РЕШЕНИЯ:
//! - Arc<dyn Any> для type-erased хранения, проверка типа по TypeId при извлечении
//! - Ключ - логическое имя бина (`accountDao`), а не тип
//! - Фабрика вызывается без удержания блокировки, поэтому может извлекать зависимости
//! - Clone-able handle; ресурсы освобождаются в `close()` или при drop последнего handle

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use aspect::{Component, InterceptionRegistry, Proxy};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ContextError, ContextResult};

/// Жизненный цикл бина
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Новый экземпляр при каждом извлечении
    Transient,
    /// Один экземпляр на весь контекст, создается лениво
    Singleton,
}

type Instance = Arc<dyn Any + Send + Sync>;
type BeanFactory = Arc<dyn Fn(&ApplicationContext) -> anyhow::Result<Instance> + Send + Sync>;
type DestroyCallback = Box<dyn FnOnce() -> anyhow::Result<()> + Send + Sync>;

struct BeanEntry {
    type_id: TypeId,
    type_name: &'static str,
    lifetime: Lifetime,
    factory: BeanFactory,
    singleton: Option<Instance>,
}

#[derive(Default)]
struct ContextState {
    beans: HashMap<String, BeanEntry>,
    registration_order: Vec<String>,
    /// Бины, которые сейчас создаются, по потоку-создателю
    creating: HashSet<(ThreadId, String)>,
    destroy_callbacks: Vec<(String, DestroyCallback)>,
    closed: bool,
}

struct ContextInner {
    registry: Arc<InterceptionRegistry>,
    state: RwLock<ContextState>,
}

impl ContextInner {
    fn close(&self) {
        let (callbacks, released) = {
            let mut state = self.state.write();
            if state.closed {
                return;
            }
            state.closed = true;
            let released = state
                .beans
                .values_mut()
                .filter_map(|entry| entry.singleton.take())
                .count();
            (std::mem::take(&mut state.destroy_callbacks), released)
        };

        // Обратный порядок регистрации, как при освобождении стека
        for (name, callback) in callbacks.into_iter().rev() {
            match callback() {
                Ok(()) => debug!(bean = %name, "destroy callback completed"),
                Err(e) => warn!(bean = %name, error = %e, "destroy callback failed"),
            }
        }

        info!(released_singletons = released, "application context closed");
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Clone)]
pub struct ApplicationContext {
    inner: Arc<ContextInner>,
}

impl ApplicationContext {
    /// Контекст поверх уже заполненного реестра. Реестр больше не изменяется.
    pub fn new(registry: Arc<InterceptionRegistry>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                registry,
                state: RwLock::new(ContextState::default()),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<InterceptionRegistry> {
        &self.inner.registry
    }

    /// Обернуть компонент в proxy с реестром этого контекста
    pub fn proxy<T: Component>(&self, target: T) -> Proxy<T> {
        Proxy::new(target, Arc::clone(self.registry()))
    }

    pub fn register_singleton<T, F>(&self, name: &str, factory: F) -> ContextResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register::<T, F>(name, factory, Lifetime::Singleton)
    }

    pub fn register_transient<T, F>(&self, name: &str, factory: F) -> ContextResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register::<T, F>(name, factory, Lifetime::Transient)
    }

    pub fn register<T, F>(&self, name: &str, factory: F, lifetime: Lifetime) -> ContextResult<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&ApplicationContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let wrapped: BeanFactory = Arc::new(move |ctx: &ApplicationContext| -> anyhow::Result<Instance> {
            Ok(Arc::new(factory(ctx)?) as Instance)
        });

        let mut state = self.inner.state.write();
        if state.closed {
            return Err(ContextError::Closed);
        }
        if state.beans.contains_key(name) {
            return Err(ContextError::DuplicateBean(name.to_string()));
        }

        state.beans.insert(
            name.to_string(),
            BeanEntry {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                lifetime,
                factory: wrapped,
                singleton: None,
            },
        );
        state.registration_order.push(name.to_string());
        debug!(bean = name, bean_type = type_name::<T>(), ?lifetime, "registered bean");

        Ok(())
    }

    /// Callback, выполняемый один раз при закрытии контекста
    pub fn on_close<F>(&self, name: &str, callback: F) -> ContextResult<()>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut state = self.inner.state.write();
        if state.closed {
            return Err(ContextError::Closed);
        }
        state
            .destroy_callbacks
            .push((name.to_string(), Box::new(callback)));
        Ok(())
    }

    /// Извлечь бин по имени и типу
    pub fn get_bean<T>(&self, name: &str) -> ContextResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let factory = {
            let state = self.inner.state.read();
            if state.closed {
                return Err(ContextError::Closed);
            }
            let entry = state
                .beans
                .get(name)
                .ok_or_else(|| ContextError::NoSuchBean(name.to_string()))?;

            if entry.type_id != TypeId::of::<T>() {
                return Err(ContextError::BeanTypeMismatch {
                    name: name.to_string(),
                    expected: type_name::<T>(),
                    actual: entry.type_name,
                });
            }

            if let Some(instance) = &entry.singleton {
                return downcast::<T>(name, instance.clone());
            }

            Arc::clone(&entry.factory)
        };

        let (lifetime, creation) = self.begin_creation(name)?;
        let created = factory(self);
        drop(creation);
        let instance = created.map_err(|source| ContextError::BeanCreation {
            name: name.to_string(),
            source,
        })?;

        if lifetime == Lifetime::Singleton {
            let mut state = self.inner.state.write();
            if state.closed {
                return Err(ContextError::Closed);
            }
            if let Some(entry) = state.beans.get_mut(name) {
                // фабрика могла уже отработать в другом потоке
                let cached = entry.singleton.get_or_insert_with(|| instance.clone());
                return downcast::<T>(name, cached.clone());
            }
        }

        debug!(bean = name, ?lifetime, "created bean");
        downcast::<T>(name, instance)
    }

    pub fn try_get_bean<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.get_bean::<T>(name).ok()
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.inner.state.read().beans.contains_key(name)
    }

    /// Имена бинов в порядке регистрации
    pub fn bean_names(&self) -> Vec<String> {
        self.inner.state.read().registration_order.clone()
    }

    pub fn bean_count(&self) -> usize {
        self.inner.state.read().beans.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.read().closed
    }

    /// Закрыть контекст: destroy callbacks в обратном порядке, сброс singleton'ов.
    /// Повторный вызов ничего не делает.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Выполнить `body` и закрыть контекст на любом пути выхода.
    pub fn run_scoped<R, F>(self, body: F) -> anyhow::Result<R>
    where
        F: FnOnce(&ApplicationContext) -> anyhow::Result<R>,
    {
        struct CloseGuard<'a>(&'a ApplicationContext);

        impl Drop for CloseGuard<'_> {
            fn drop(&mut self) {
                self.0.close();
            }
        }

        let guard = CloseGuard(&self);
        body(guard.0)
    }

    /// Цикл - это повторный запрос того же бина из того же потока.
    /// Другие потоки создают свой экземпляр, в кэш попадает первый.
    fn begin_creation(&self, name: &str) -> ContextResult<(Lifetime, CreationGuard<'_>)> {
        let key = (thread::current().id(), name.to_string());
        let mut state = self.inner.state.write();
        let lifetime = state
            .beans
            .get(name)
            .map(|entry| entry.lifetime)
            .ok_or_else(|| ContextError::NoSuchBean(name.to_string()))?;
        if !state.creating.insert(key.clone()) {
            return Err(ContextError::CircularReference(name.to_string()));
        }
        Ok((
            lifetime,
            CreationGuard {
                inner: &self.inner,
                key,
            },
        ))
    }
}

/// Снимает отметку "создается" на любом пути выхода, включая panic в фабрике.
struct CreationGuard<'a> {
    inner: &'a ContextInner,
    key: (ThreadId, String),
}

impl Drop for CreationGuard<'_> {
    fn drop(&mut self) {
        self.inner.state.write().creating.remove(&self.key);
    }
}

fn downcast<T: Send + Sync + 'static>(name: &str, instance: Instance) -> ContextResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ContextError::BeanTypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
            actual: "<unknown>",
        })
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("ApplicationContext")
            .field("beans", &state.registration_order)
            .field("rules", &self.inner.registry.len())
            .field("closed", &state.closed)
            .finish()
    }
}
