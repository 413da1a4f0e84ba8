//! Terraform Cloud workspace variables (API v2, JSON:API).

mod client;
pub mod types;

pub use client::{
    DEFAULT_API_URL, TOKEN_ENV, TerraformClient, UpsertAction, WorkspaceTarget, match_workspace,
    plan_upsert,
};
pub use types::{Variable, Workspace};

/// Organization used when `--organization` is not given.
pub const DEFAULT_ORGANIZATION: &str = "cory-huebner-training";
