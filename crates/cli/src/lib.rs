//! Оркестратор демо
//!
//! Собирает контекст из конфигурации, извлекает оба DAO по имени и типу и
//! выполняет фиксированную последовательность вызовов. Контекст закрывается
//! на любом пути выхода.

use std::sync::Arc;

use aspect::Proxy;
use common::{LoggingConfig, OperationTimer};
use context::{create_context, AppConfig, ApplicationContext, ContextError};
use domain::{
    Account, AccountDao, AccountOperations, ConsoleSink, LoggingAspect, MembershipDao,
    MembershipOperations,
};
use tracing::{debug, info};

pub const ACCOUNT_DAO: &str = "accountDao";
pub const MEMBERSHIP_DAO: &str = "membershipDao";

/// Итог одного прогона
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub advice_invocations: usize,
    pub calls: usize,
}

/// Контекст с advice из конфигурации и двумя DAO-бинами
pub fn build_context(
    config: &AppConfig,
    console: Arc<dyn ConsoleSink>,
) -> Result<ApplicationContext, ContextError> {
    let mut builder = create_context();
    for rule in &config.aspects {
        let advice = LoggingAspect::new(Arc::clone(&console)).with_message(rule.message.clone());
        builder = builder.aspect(&rule.pointcut, advice);
    }

    let account_console = Arc::clone(&console);
    let membership_console = console;
    builder
        .singleton(ACCOUNT_DAO, move |ctx| {
            Ok(ctx.proxy(AccountDao::new(Arc::clone(&account_console))))
        })
        .singleton(MEMBERSHIP_DAO, move |ctx| {
            Ok(ctx.proxy(MembershipDao::new(Arc::clone(&membership_console))))
        })
        .on_close("daos", || {
            debug!("releasing DAO beans");
            Ok(())
        })
        .build()
}

/// Демо процесса `aopdemo`: одно правило `DEFAULT_POINTCUT`, без внешней конфигурации
pub fn run_demo(console: Arc<dyn ConsoleSink>) -> anyhow::Result<RunReport> {
    run(&AppConfig::default(), console)
}

/// Логирование процесса `aopdemo`: уровень по умолчанию, RUST_LOG не учитывается
pub fn demo_logging() -> LoggingConfig {
    AppConfig::default().logging.without_env_override()
}

/// Выполнить демо: addAccount, doWork, addAccount, goToSleep
pub fn run(config: &AppConfig, console: Arc<dyn ConsoleSink>) -> anyhow::Result<RunReport> {
    let mut timer = OperationTimer::new("aopdemo.run");
    timer.add_field("aspects", config.aspects.len());

    let result = run_sequence(config, console);
    timer.finish_with_result(&result);
    result
}

fn run_sequence(config: &AppConfig, console: Arc<dyn ConsoleSink>) -> anyhow::Result<RunReport> {
    let context = build_context(config, console)?;
    let registry = Arc::clone(context.registry());
    info!(rules = registry.len(), beans = context.bean_count(), "context ready");

    let calls = context.run_scoped(|ctx| {
        let account_dao = ctx.get_bean::<Proxy<AccountDao>>(ACCOUNT_DAO)?;
        let membership_dao = ctx.get_bean::<Proxy<MembershipDao>>(MEMBERSHIP_DAO)?;
        let mut calls = 0;

        let account = Account::default();
        account_dao.add_account(&account, true)?;
        calls += 1;
        account_dao.do_work()?;
        calls += 1;

        membership_dao.add_account()?;
        calls += 1;
        membership_dao.go_to_sleep()?;
        calls += 1;

        Ok(calls)
    })?;

    Ok(RunReport {
        advice_invocations: registry.advice_invocations(),
        calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use context::AspectConfig;
    use domain::RecordingSink;

    #[test]
    fn test_default_run_reports_one_advice_per_call() {
        let sink = Arc::new(RecordingSink::new());
        let report = run(&AppConfig::default(), sink.clone()).unwrap();

        assert_eq!(
            report,
            RunReport {
                advice_invocations: 4,
                calls: 4
            }
        );
        assert_eq!(sink.lines().len(), 8);
    }

    #[test]
    fn test_demo_is_fixed_to_default_rule() {
        let sink = Arc::new(RecordingSink::new());
        let report = run_demo(sink.clone()).unwrap();
        assert_eq!(report.advice_invocations, 4);
        assert_eq!(report.calls, 4);

        let logging = demo_logging();
        assert!(!logging.env_override);
        assert_eq!(logging.level, "warn");
    }

    #[test]
    fn test_context_exposes_both_beans() {
        let ctx = build_context(&AppConfig::default(), Arc::new(RecordingSink::new())).unwrap();
        assert_eq!(ctx.bean_names(), vec![ACCOUNT_DAO, MEMBERSHIP_DAO]);
        assert!(ctx.get_bean::<Proxy<AccountDao>>(ACCOUNT_DAO).is_ok());
        assert!(ctx.get_bean::<AccountDao>(ACCOUNT_DAO).is_err());
    }

    #[test]
    fn test_invalid_aspect_fails_before_any_output() {
        let config = AppConfig {
            aspects: vec![AspectConfig::new("execution(* aopdemo.dao.*.*(")],
            ..AppConfig::default()
        };
        let sink = Arc::new(RecordingSink::new());

        let err = run(&config, sink.clone()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContextError>(),
            Some(ContextError::Configuration(_))
        ));
        assert!(sink.lines().is_empty());
    }
}
