//! CircleCI project environment variables (API v2).

mod client;

pub use client::{CircleCiClient, DEFAULT_API_URL, Project, TOKEN_ENV};

/// Organization used when `--organization` is not given.
pub const DEFAULT_ORGANIZATION: &str = "cohuebn";
