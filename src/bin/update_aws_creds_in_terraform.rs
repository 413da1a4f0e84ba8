//! Updates AWS credentials in a Terraform Cloud workspace from environment variables.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use aws_creds_sync::cli::{self, CommonArgs};
use aws_creds_sync::infra::terraform::{self, TerraformClient};
use aws_creds_sync::logging::LogConfig;
use aws_creds_sync::secrets::SecretEntry;
use aws_creds_sync::sync::{self, SyncReport};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "update-aws-creds-in-terraform")]
#[command(about = "Update AWS credentials using environment variables for the given Terraform workspace", long_about = None)]
struct Cli {
    /// The name of the Terraform organization to use for workspace lookup.
    #[arg(short, long, default_value = terraform::DEFAULT_ORGANIZATION)]
    organization: String,

    /// The name of the Terraform workspace to add creds to.
    #[arg(short, long)]
    workspace: String,

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
    let token = cli::api_token(terraform::TOKEN_ENV)?;
    let base_url = cli::api_url(args.common.api_url.as_deref(), terraform::DEFAULT_API_URL)?;
    let entries = SecretEntry::collect_from_env()?;
    let store = Arc::new(TerraformClient::connect(&token, base_url)?);

    sync::run(
        store,
        &args.organization,
        &args.workspace,
        entries,
    )
    .await
}
