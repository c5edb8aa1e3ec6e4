use aspect::{CallDescriptor, InterceptionRegistry, MethodPattern, PatternError};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Отдельный тип ошибки, чтобы проверить что он сохраняется через invoke
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("dao failure: {0}")]
struct DaoFailure(&'static str);

static PARAMS: [&str; 2] = ["Account", "bool"];

const DAO_RULE: &str = "execution(* aopdemo.dao.*.*(..))";

fn recording_registry(
    pointcuts: &[&str],
    log: &Arc<Mutex<Vec<String>>>,
) -> Result<InterceptionRegistry, PatternError> {
    let mut registry = InterceptionRegistry::new();
    for (i, pointcut) in pointcuts.iter().enumerate() {
        let log = log.clone();
        registry.register(pointcut, move || {
            log.lock().unwrap().push(format!("advice-{i}"));
            Ok(())
        })?;
    }
    Ok(registry)
}

#[test]
fn test_demo_sequence_fires_one_advice_per_call() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&[DAO_RULE], &log).unwrap();

    let calls = [
        CallDescriptor::new("aopdemo.dao", "AccountDao", "addAccount").with_params(&["Account", "bool"]),
        CallDescriptor::new("aopdemo.dao", "AccountDao", "doWork").with_return_type("bool"),
        CallDescriptor::new("aopdemo.dao", "MembershipDao", "addAccount"),
        CallDescriptor::new("aopdemo.dao", "MembershipDao", "goToSleep"),
    ];

    for call in &calls {
        let l = log.clone();
        let label = call.to_string();
        registry
            .invoke(call, move || {
                l.lock().unwrap().push(label);
                Ok(())
            })
            .unwrap();
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 8);
    for (pair, call) in log.chunks(2).zip(&calls) {
        assert_eq!(pair[0], "advice-0");
        assert_eq!(pair[1], call.to_string());
    }
    assert_eq!(registry.advice_invocations(), 4);
}

#[test]
fn test_real_method_error_propagates_unchanged() {
    let mut registry = InterceptionRegistry::new();
    registry.register(DAO_RULE, || Ok(())).unwrap();

    let call = CallDescriptor::new("aopdemo.dao", "AccountDao", "doWork");
    let result: anyhow::Result<bool> =
        registry.invoke(&call, || Err(DaoFailure("disk on fire").into()));

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "dao failure: disk on fire");
    assert_eq!(err.downcast_ref::<DaoFailure>(), Some(&DaoFailure("disk on fire")));
    assert_eq!(registry.advice_invocations(), 1);
}

#[test]
fn test_advice_calling_back_into_registry_does_not_recurse() {
    let registry = Arc::new(Mutex::new(None::<Arc<InterceptionRegistry>>));
    let nested_real = Arc::new(AtomicUsize::new(0));
    let advice_runs = Arc::new(AtomicUsize::new(0));

    let mut builder = InterceptionRegistry::new();
    {
        let registry = registry.clone();
        let nested_real = nested_real.clone();
        let advice_runs = advice_runs.clone();
        builder
            .register(DAO_RULE, move || {
                advice_runs.fetch_add(1, Ordering::SeqCst);
                let inner = registry.lock().unwrap().clone().expect("registry installed");
                let call = CallDescriptor::new("aopdemo.dao", "AccountDao", "doWork");
                inner.invoke(&call, || {
                    nested_real.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .unwrap();
    }
    let shared = Arc::new(builder);
    *registry.lock().unwrap() = Some(shared.clone());

    let call = CallDescriptor::new("aopdemo.dao", "MembershipDao", "goToSleep");
    shared.invoke(&call, || Ok(())).unwrap();

    assert_eq!(advice_runs.load(Ordering::SeqCst), 1);
    assert_eq!(nested_real.load(Ordering::SeqCst), 1);
    assert_eq!(shared.advice_invocations(), 1);
}

#[test]
fn test_builder_pattern_registers_like_expression() {
    let pattern = MethodPattern::builder()
        .in_namespace("aopdemo.dao")
        .build()
        .unwrap();
    let parsed = aspect::parse_pointcut(DAO_RULE).unwrap();
    assert_eq!(pattern, parsed);
}

fn method_names() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("addAccount"),
        Just("addMember"),
        Just("doWork"),
        Just("goToSleep"),
    ]
}

fn pointcuts() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("execution(* aopdemo.dao.*.*(..))"),
        Just("execution(* add*(..))"),
        Just("execution(* doWork(..))"),
        Just("execution(void *())"),
        Just("execution(* aopdemo.service.*.*(..))"),
        Just("execution(* *(..))"),
    ]
}

proptest! {
    #[test]
    fn prop_exactly_matching_advice_runs_in_order_before_real(
        rules in prop::collection::vec(pointcuts(), 0..6),
        method in method_names(),
        namespace in prop_oneof![Just("aopdemo.dao"), Just("aopdemo.service"), Just("aopdemo.daoextra")],
        arity in 0usize..3,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&rules, &log).unwrap();

        let call = CallDescriptor::new(namespace, "Probe", method).with_params(&PARAMS[..arity]);

        let expected: Vec<String> = registry
            .rules()
            .iter()
            .filter(|rule| rule.pattern().matches(&call))
            .map(|rule| format!("advice-{}", rule.order()))
            .collect();

        let l = log.clone();
        registry.invoke(&call, move || {
            l.lock().unwrap().push("real".to_string());
            Ok(())
        }).unwrap();

        let log = log.lock().unwrap();
        prop_assert_eq!(log.last().map(String::as_str), Some("real"));
        prop_assert_eq!(&log[..log.len() - 1], expected.as_slice());
        prop_assert_eq!(registry.advice_invocations(), expected.len());
    }
}
