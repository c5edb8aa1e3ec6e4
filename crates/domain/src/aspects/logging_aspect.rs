use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aspect::{Advice, CallDescriptor};
use tracing::trace;

use crate::console::ConsoleSink;

const BANNER: &str = "\n====>>> ";
/// Текст advice по умолчанию, одинаковый для всех перехваченных методов
pub const DEFAULT_MESSAGE: &str = "Executing @Before advice on addAccount";

/// Before-advice, печатающий фиксированную строку перед каждым перехваченным вызовом.
pub struct LoggingAspect {
    console: Arc<dyn ConsoleSink>,
    message: Option<String>,
    fired: AtomicUsize,
}

impl LoggingAspect {
    pub fn new(console: Arc<dyn ConsoleSink>) -> Self {
        Self {
            console,
            message: None,
            fired: AtomicUsize::new(0),
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn render(&self) -> String {
        format!("{BANNER}{}", self.message.as_deref().unwrap_or(DEFAULT_MESSAGE))
    }

    pub fn invocations(&self) -> usize {
        self.fired.load(Ordering::Relaxed)
    }
}

impl Advice for LoggingAspect {
    fn before(&self, call: &CallDescriptor<'_>) -> anyhow::Result<()> {
        trace!(call = %call, "logging aspect fired");
        self.console.print_line(&self.render())?;
        self.fired.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "LoggingAspect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::RecordingSink;

    #[test]
    fn test_default_line_is_fixed_and_message_overrides_it() {
        let sink = Arc::new(RecordingSink::new());
        let call = CallDescriptor::new("aopdemo.dao", "MembershipDao", "goToSleep");

        let aspect = LoggingAspect::new(sink.clone());
        aspect.before(&call).unwrap();
        aspect.before(&call).unwrap();

        let custom = LoggingAspect::new(sink.clone()).with_message(Some("audit".to_string()));
        custom.before(&call).unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "\n====>>> Executing @Before advice on addAccount",
                "\n====>>> Executing @Before advice on addAccount",
                "\n====>>> audit",
            ]
        );
        assert_eq!(aspect.invocations(), 2);
        assert_eq!(aspect.name(), "LoggingAspect");
    }
}
