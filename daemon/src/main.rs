mod action;
mod config;
mod dispatch;
mod input;
mod process_monitor;
mod settings;
mod trigger;
mod watch;

use std::path::Path;

use crate::input::EnigoSimulator;
use crate::process_monitor::SysinfoProcessLister;
use crate::watch::TipEngine;

#[tokio::main]
async fn main() {
    // ── Settings ──────────────────────────────────────────────────────────────
    let settings = settings::load_or_default(Path::new(settings::SETTINGS_FILE_NAME))
        .unwrap_or_else(|e| {
            eprintln!("[settings] Error (using defaults): {e:#}");
            settings::Settings::default()
        });

    // ── Logging ───────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&settings.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings::DEFAULT_LOG_LEVEL)),
        )
        .init();

    tracing::info!("tipmacro-daemon v{} starting", env!("CARGO_PKG_VERSION"));

    // ── Game configs ──────────────────────────────────────────────────────────
    let report = match config::load_all(&settings.config_dir, &settings.config_suffix) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "failed to load game configs");
            std::process::exit(1);
        }
    };
    for diagnostic in &report.diagnostics {
        tracing::warn!("{diagnostic}");
    }
    if report.table.is_empty() {
        tracing::warn!(
            dir = %settings.config_dir.display(),
            suffix = %settings.config_suffix,
            "no game configs found; tips will never dispatch"
        );
    }
    for name in report.table.target_names() {
        tracing::info!(game = name, "loaded game config");
    }
    tracing::info!(
        files = report.files_loaded,
        games = report.table.len(),
        "game configs loaded"
    );

    // ── Trigger watch ─────────────────────────────────────────────────────────
    let subscription = match watch::subscribe(&settings.trigger_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to watch trigger file");
            std::process::exit(1);
        }
    };

    let engine = TipEngine::new(report.table, SysinfoProcessLister::new(), EnigoSimulator);
    let mut watch_task = tokio::spawn(watch::run(subscription, engine));

    // Runs until externally terminated.
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = shutdown => {}
        res = &mut watch_task => {
            if let Err(e) = res {
                tracing::error!(error = %e, "watch loop panicked");
            }
        }
    }
    // Aborting drops the subscription, which releases the trigger watch.
    watch_task.abort();
}
