use clap::Parser;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use commands::cli::{self, Commands};
use commands::shell::{self, ShellOptions};
use error::CliError;
use output::Printer;
use pagestate_core::clock::{Clock, SystemClock};
use pagestate_core::config::{AppConfig, StorageBackend};
use pagestate_core::page::Page;
use pagestate_plugins::{factory, AppKind};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg =
        pagestate_core::config::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    if args.memory {
        cfg.storage.backend = StorageBackend::Memory;
    }
    init_tracing(&cfg.logging).map_err(CliError::Config)?;
    tracing::debug!(app = %args.app, backend = ?cfg.storage.backend, "starting");

    let command = args.command.unwrap_or(Commands::Render);
    let opts = ShellOptions {
        printer: Printer { json: args.json },
        tick_action: tick_action(args.app),
    };
    dispatch(args.app, &cfg, command, opts).await
}

fn tick_action(kind: AppKind) -> Option<&'static str> {
    match kind {
        AppKind::Workout => Some("timer-tick"),
        _ => None,
    }
}

async fn dispatch(
    kind: AppKind,
    cfg: &AppConfig,
    command: Commands,
    opts: ShellOptions,
) -> Result<i32, CliError> {
    let kv = factory::build_kv(cfg)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let quiet = factory::quiet_period(cfg);
    match kind {
        AppKind::Library => {
            let app = factory::build_library(cfg, kv, clock)?;
            shell::run(Page::new(app, quiet), command, opts).await
        }
        AppKind::Shop => {
            let app = factory::build_shop(cfg, kv);
            shell::run(Page::new(app, quiet), command, opts).await
        }
        AppKind::Planner => {
            let app = factory::build_planner(cfg, kv, clock)?;
            shell::run(Page::new(app, quiet), command, opts).await
        }
        AppKind::Workout => {
            let app = factory::build_workout(cfg, kv, clock);
            shell::run(Page::new(app, quiet), command, opts).await
        }
    }
}

fn init_tracing(logging: &pagestate_core::config::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("pagestate"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("pagestate.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    // Frames go to stdout, so console logs stay on stderr.
    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
