//! nextgric RAN slice control xApp
//!
//! This is the main binary of the xApp. It implements:
//! - CLI argument parsing
//! - Configuration loading and validation
//! - KPI sink setup from the environment
//! - Task spawning and lifecycle management
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! DB_NAME=flexric_db nr-xapp -c config/xapp.yaml --db-dir /var/lib/nr-xapp
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use nextgric_common::{init_logging, DbConfig, LogLevel};
use nextgric_xapp::{
    kpm_indication_callback, load_and_validate_xapp_config, E2Runtime, KpmMonitor,
    MetricsAggregator, RcControlRunner, RestTask, ShutdownReason, ShutdownSignal, SimE2Runtime,
    SqliteKpiSink, TaskManager, DEFAULT_SHUTDOWN_TIMEOUT_MS,
};

/// nextgric xApp - KPM monitoring and RC slice control
#[derive(Parser, Debug)]
#[command(name = "nr-xapp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the xApp configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: String,

    /// Disable the REST control endpoint
    #[arg(long = "disable-rest")]
    disable_rest: bool,

    /// Disable KPM monitoring
    #[arg(long = "disable-monitor")]
    disable_monitor: bool,

    /// Directory holding the KPI database file
    #[arg(long = "db-dir", value_name = "DIR", default_value = ".")]
    db_dir: PathBuf,
}

/// Application state for the xApp
struct XappApp {
    task_manager: TaskManager,
    signal: ShutdownSignal,
    runtime: Arc<SimE2Runtime>,
    aggregator: Arc<MetricsAggregator<SqliteKpiSink>>,
}

impl XappApp {
    async fn new(args: &Args) -> Result<Self> {
        let config_path = &args.config_file;
        let config = load_and_validate_xapp_config(config_path)
            .with_context(|| format!("Failed to load configuration from {config_path}"))?;
        init_logging(config.log_level);

        info!("Configuration loaded from {}: {}", config_path, config.name);
        info!(
            "PLMN={}, KPM function={}, RC function={}, {} slice filter(s), {} node(s)",
            config.plmn,
            config.kpm.ran_function_id,
            config.rc.ran_function_id,
            config.kpm.slice_filters.len(),
            config.nodes.len()
        );

        let db = DbConfig::from_env().context("Invalid KPI database environment")?;
        info!(?db, "KPI database parameters");
        let sink = SqliteKpiSink::open_in_dir(&db, &args.db_dir)
            .with_context(|| format!("Failed to open KPI database in {}", args.db_dir.display()))?;
        let aggregator = Arc::new(MetricsAggregator::new(sink));

        let runtime = Arc::new(SimE2Runtime::from_config(&config));
        runtime.start().context("Failed to start E2 runtime")?;

        let signal = ShutdownSignal::new();
        let mut task_manager = TaskManager::new(signal.clone());

        if args.disable_monitor {
            info!("KPM monitoring disabled");
        } else {
            let callback = kpm_indication_callback(aggregator.clone(), signal.clone());
            task_manager.spawn(KpmMonitor::new(runtime.clone(), config.kpm.clone(), callback));
            info!("KPM monitor task spawned");
        }

        if args.disable_rest {
            info!("REST endpoint disabled");
        } else {
            let runner = Arc::new(RcControlRunner::new(
                runtime.clone(),
                config.plmn,
                config.rc.ran_function_id,
            ));
            task_manager.spawn(RestTask::new(config.rest.clone(), runner, signal.clone()));
            info!("REST task spawned");
        }

        Ok(Self {
            task_manager,
            signal,
            runtime,
            aggregator,
        })
    }

    /// Runs until a process signal or a fatal error.
    async fn run(&self) -> ShutdownReason {
        info!("xApp started, waiting for shutdown signal...");

        let reason = tokio::select! {
            reason = termination_signal() => reason,
            reason = self.signal.wait() => reason,
        };
        self.signal.trigger(reason.clone());
        // A fatal error raised in the meantime takes precedence.
        let reason = self.signal.reason().unwrap_or(reason);
        info!("Shutting down: {}", reason);
        reason
    }

    /// Stops the tasks, then the runtime, then closes the sink.
    async fn shutdown(mut self) {
        if let Err(e) = self.task_manager.shutdown(DEFAULT_SHUTDOWN_TIMEOUT_MS).await {
            warn!("Some tasks failed during shutdown: {}", e);
        }

        while !self.runtime.try_stop() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        info!("E2 runtime stopped");

        info!(
            reports = self.aggregator.reports_processed(),
            "Closing KPI sink"
        );
        drop(self.aggregator);
        info!("xApp stopped");
    }
}

#[cfg(unix)]
async fn termination_signal() -> ShutdownReason {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = tokio::signal::ctrl_c() => ShutdownReason::Signal("SIGINT"),
            _ = sigterm.recv() => ShutdownReason::Signal("SIGTERM"),
        },
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            ShutdownReason::Signal("SIGINT")
        }
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> ShutdownReason {
    let _ = tokio::signal::ctrl_c().await;
    ShutdownReason::Signal("SIGINT")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run_xapp(args).await {
        Ok(reason) if reason.is_fatal() => {
            error!("xApp terminated: {}", reason);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be set up yet if the configuration failed.
            init_logging(LogLevel::Info);
            error!("xApp failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main xApp execution logic
async fn run_xapp(args: Args) -> Result<ShutdownReason> {
    let app = XappApp::new(&args).await?;
    let reason = app.run().await;
    app.shutdown().await;
    Ok(reason)
}
