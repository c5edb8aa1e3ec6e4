use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use common::init_logging;
use domain::StdoutSink;
use tracing::info;

/// Запускает фиксированную последовательность вызовов с правилом
/// `execution(* aopdemo.dao.*.*(..))`. Флагов, переменных окружения и
/// конфигурационного файла нет.
#[derive(Parser)]
#[command(name = "aopdemo")]
#[command(about = "Before-advice interception demo over two DAOs")]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    Cli::parse();

    init_logging(&cli::demo_logging())?;

    let report = cli::run_demo(Arc::new(StdoutSink))?;
    info!(
        calls = report.calls,
        advice_invocations = report.advice_invocations,
        "demo finished"
    );

    Ok(())
}
