//! Pieces shared by the two command-line tools.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use reqwest::Url;
use tracing::{error, info};

use crate::error::SyncError;
use crate::sync::SyncReport;

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Should debug logging be enabled?
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Override the API base URL (e.g. for a self-hosted instance)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}

/// Loads a `.env` file from the working directory, if there is one.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Reads an API token; unset and empty are both missing.
pub fn api_token(var: &'static str) -> Result<String, SyncError> {
    std::env::var(var)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or(SyncError::MissingToken(var))
}

pub fn api_url(overridden: Option<&str>, default: &str) -> Result<Url> {
    let raw = overridden.unwrap_or(default);
    Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))
}

/// Logs the outcome of a run and maps it to the process exit status.
pub fn exit_code(result: Result<SyncReport>) -> ExitCode {
    match result {
        Ok(report) => {
            info!(
                updated = ?report.updated,
                skipped = ?report.skipped,
                "AWS credentials synced"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
