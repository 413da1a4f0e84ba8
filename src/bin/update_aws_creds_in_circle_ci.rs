//! Updates AWS credentials in a CircleCI project from environment variables.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use aws_creds_sync::cli::{self, CommonArgs};
use aws_creds_sync::infra::circleci::{self, CircleCiClient};
use aws_creds_sync::logging::LogConfig;
use aws_creds_sync::secrets::SecretEntry;
use aws_creds_sync::sync::{self, SyncReport};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "update-aws-creds-in-circle-ci")]
#[command(about = "Update AWS credentials using environment variables for the given CircleCI project", long_about = None)]
struct Cli {
    /// The name of the CircleCI organization to use for project lookup.
    #[arg(short, long, default_value = circleci::DEFAULT_ORGANIZATION)]
    organization: String,

    /// The name of the CircleCI project to add creds to.
    #[arg(short, long)]
    project: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    cli::load_dotenv();
    let args = Cli::parse();

    let _log_guard = match LogConfig::from_env(args.common.debug).init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    cli::exit_code(run(args).await)
}

async fn run(args: Cli) -> Result<SyncReport> {
    let token = cli::api_token(circleci::TOKEN_ENV)?;
    let base_url = cli::api_url(args.common.api_url.as_deref(), circleci::DEFAULT_API_URL)?;
    let entries = SecretEntry::collect_from_env()?;
    let store = Arc::new(CircleCiClient::connect(&token, base_url)?);

    sync::run(
        store,
        &args.organization,
        &args.project,
        entries,
    )
    .await
}
