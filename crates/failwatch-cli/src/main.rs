//! failwatch - Jenkins job failure watchdog
//!
//! Checks every enabled job once and prints a summary of the jobs that need
//! attention:
//!
//! - jobs whose state could not be read,
//! - jobs whose last build failed over the stale threshold ago,
//! - jobs that failed twice in a row (aborted builds in between are ignored).
//!
//! Exit codes: `0` healthy, `1` alerting, `2` configuration or roster error.

mod config;
mod notify;
mod watch;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use failwatch_jenkins::JenkinsClient;
use tracing::{info, warn, Level};

use crate::config::{Cli, OutputFormat, Settings};
use crate::notify::SlackNotifier;

/// Exit code for aborted runs.
const EXIT_ABORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    failwatch_core::init_tracing(cli.json_logs, level);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::resolve(cli, |key| std::env::var(key).ok())
        .context("Invalid configuration")?;

    if settings.format == OutputFormat::Text {
        println!("jenkins url: {}", settings.jenkins.base_url);
    }
    info!(auth = settings.jenkins.auth.kind(), "connecting to Jenkins");

    let timeout = settings.jenkins.timeout;
    let client =
        JenkinsClient::new(settings.jenkins.clone()).context("Failed to create Jenkins client")?;

    let summary = watch::check_roster(&client, &settings.filter, settings.stale_after)
        .await
        .context("Failed to list Jenkins jobs")?;

    match settings.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if summary.alerting {
        if let Some(slack) = settings.slack {
            match SlackNotifier::new(slack, timeout) {
                Ok(notifier) => {
                    if let Err(e) = notifier.send(&summary.sections_text()).await {
                        warn!(error = %e, "webhook delivery failed");
                        eprintln!("webhook error: {}", e);
                    }
                }
                Err(e) => eprintln!("webhook error: {}", e),
            }
        }
    }

    Ok(ExitCode::from(summary.exit_code()))
}
