//! Copies AWS credentials from the process environment into remote
//! variable stores (CircleCI projects and Terraform Cloud workspaces).

pub mod cli;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod logging;
pub mod secrets;
pub mod services;
pub mod sync;
