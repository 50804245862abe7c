//! wuprobe
//!
//! Checks Windows Update posture, reports it to an Opsview server and exits
//! with the monitoring plugin status code.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info, warn};
use wuprobe_api::StatusCode;
use wuprobe_client::HttpClient;
use wuprobe_core::{Credentials, OpsviewReporter, Probe, ReportTarget};
use wuprobe_inventory::{CachedSource, PowerShell, UpdateSource, WindowsUpdateSource};

mod cli;
mod config;
mod logging;

use cli::Args;
use config::{Config, Settings};

/// Print `UNKNOWN - <reason>` and exit 3
fn unknown(reason: impl std::fmt::Display) -> ExitCode {
    println!("{} - {reason}", StatusCode::Unknown);
    ExitCode::from(StatusCode::Unknown.exit_code())
}

fn build_probe(settings: &Settings) -> eyre::Result<Probe> {
    let shell = PowerShell::new(settings.inventory_timeout).with_program(&settings.powershell);
    let windows: Arc<dyn UpdateSource> = Arc::new(WindowsUpdateSource::new(shell));
    let source: Arc<dyn UpdateSource> = match &settings.cache {
        Some(cache) => {
            Arc::new(CachedSource::new(windows, &cache.path).with_expiry(cache.expiry))
        }
        None => windows,
    };

    let client = HttpClient::with_timeout(&settings.url, settings.timeout)?;
    let reporter = OpsviewReporter::new(
        client,
        Credentials {
            username: settings.username.clone(),
            password: settings.password.clone(),
        },
        ReportTarget {
            hostname: settings.hostname.clone(),
            service: settings.service.clone(),
        },
    );

    Ok(Probe::new(source, Arc::new(reporter), settings.severities))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize error handling
    if let Err(e) = color_eyre::install() {
        return unknown(e);
    }

    // Parse arguments; usage errors must not leak clap's exit code 2
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let rendered = e.to_string();
            return unknown(rendered.lines().next().unwrap_or("invalid arguments"));
        }
    };

    // Load configuration
    let mut config = match Config::load_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return unknown(format!("configuration error: {e:#}")),
    };
    config.merge(&args);

    // Initialize logging
    match logging::init(&config.log) {
        Ok(path) => info!(path = %path.display(), "wuprobe starting"),
        Err(e) => return unknown(format!("cannot set up logging: {e:#}")),
    }

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return unknown(format!("configuration error: {e:#}"));
        }
    };

    let probe = match build_probe(&settings) {
        Ok(probe) => probe,
        Err(e) => {
            error!(error = %e, "failed to set up probe");
            return unknown(format!("configuration error: {e:#}"));
        }
    };

    let outcome = probe.run().await;

    if let Err(e) = &outcome.submitted
        && e.is_timeout()
    {
        warn!(timeout = ?settings.timeout, "monitoring server timed out");
    }

    println!("{}", outcome.plugin_output());
    info!(
        status = %outcome.status(),
        exit_code = outcome.exit_code(),
        submitted = outcome.submitted.is_ok(),
        "wuprobe finished"
    );

    ExitCode::from(outcome.exit_code())
}
