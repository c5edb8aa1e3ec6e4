//! Proxy wrapping a component so its method calls pass through the registry.
//!
//! Advice is applied at composition time, not inside the component:
//!
//! ```ignore
//! let dao = Proxy::new(AccountDao::new(sink), registry.clone());
//! dao.add_account(&account, true)?; // advice runs first
//! ```

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{CallDescriptor, MethodSignature};
use crate::registry::InterceptionRegistry;

/// Type metadata used to build call descriptors.
pub trait Component: Send + Sync + 'static {
    /// Логический пакет, например `aopdemo.dao`
    const NAMESPACE: &'static str;
    const TYPE_NAME: &'static str;
}

pub struct Proxy<T> {
    target: Arc<T>,
    registry: Arc<InterceptionRegistry>,
}

impl<T: Component> Proxy<T> {
    pub fn new(target: T, registry: Arc<InterceptionRegistry>) -> Self {
        Self::from_arc(Arc::new(target), registry)
    }

    pub fn from_arc(target: Arc<T>, registry: Arc<InterceptionRegistry>) -> Self {
        Self { target, registry }
    }

    /// The wrapped instance; calls made on it directly are not advised.
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn registry(&self) -> &Arc<InterceptionRegistry> {
        &self.registry
    }

    /// Route one method call through the registry.
    pub fn call<R, F>(&self, signature: &MethodSignature, method: F) -> anyhow::Result<R>
    where
        F: FnOnce(&T) -> anyhow::Result<R>,
    {
        let call = CallDescriptor::of::<T>(signature);
        self.registry.invoke(&call, || method(&self.target))
    }
}

impl<T> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Component> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("target", &format_args!("{}.{}", T::NAMESPACE, T::TYPE_NAME))
            .field("rules", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        hits: AtomicUsize,
    }

    impl Component for Counter {
        const NAMESPACE: &'static str = "test.dao";
        const TYPE_NAME: &'static str = "Counter";
    }

    impl Counter {
        const HIT: MethodSignature = MethodSignature::public("hit", &[], "usize");

        fn hit(&self) -> anyhow::Result<usize> {
            Ok(self.hits.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    #[test]
    fn test_proxy_routes_through_registry() {
        let advised = Arc::new(AtomicUsize::new(0));
        let mut registry = InterceptionRegistry::new();
        let a = advised.clone();
        registry
            .register("execution(usize test.dao.Counter.hit())", move || {
                a.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let proxy = Proxy::new(
            Counter {
                hits: AtomicUsize::new(0),
            },
            Arc::new(registry),
        );

        assert_eq!(proxy.call(&Counter::HIT, Counter::hit).unwrap(), 1);
        assert_eq!(advised.load(Ordering::SeqCst), 1);

        // прямой вызов на target не перехватывается
        assert_eq!(proxy.target().hit().unwrap(), 2);
        assert_eq!(advised.load(Ordering::SeqCst), 1);

        let cloned = proxy.clone();
        assert_eq!(cloned.call(&Counter::HIT, Counter::hit).unwrap(), 3);
        assert_eq!(advised.load(Ordering::SeqCst), 2);
    }
}
