//! Error conditions callers are expected to inspect.
//!
//! Everything else travels as [`anyhow::Error`] with context attached at the
//! call site.

use reqwest::StatusCode;
use thiserror::Error;

use crate::secrets::SecretName;

/// A remote call that did not produce a usable response.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request failed with status {} ({reason})", .status.as_u16())]
    Status { status: StatusCode, reason: String },

    #[error("request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid api base url: {0}")]
    BaseUrl(String),

    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),
}

impl RequestError {
    /// HTTP status of a rejected request, if the remote answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Failures of a sync run as a whole.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("no {kind} exists with name {name} in organization {organization}")]
    ResourceNotFound {
        kind: &'static str,
        organization: String,
        name: String,
    },

    #[error("{} secret(s) failed to sync: {}", .failed.len(), join_names(.failed))]
    UpsertFailed { failed: Vec<SecretName> },

    #[error("environment variable {0} must be set")]
    MissingToken(&'static str),

    #[error("environment variable {0} is not valid UTF-8")]
    InvalidSecretValue(SecretName),
}

fn join_names(names: &[SecretName]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
