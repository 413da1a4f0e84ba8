//! Trait for remote key/value stores that hold CI or workspace variables.

use anyhow::Result;

use crate::secrets::SecretName;

/// A remote variable store addressed by organization and resource name.
///
/// `resolve` runs once per sync; `upsert` then runs concurrently for each
/// secret against the resolved target, so the target must be shareable
/// across tasks.
#[async_trait::async_trait]
pub trait VariableStore: Send + Sync {
    /// Whatever the store needs to address variables of one resource.
    type Target: Send + Sync;

    /// Looks up `name` (a project or workspace) inside `organization`.
    async fn resolve(&self, organization: &str, name: &str) -> Result<Self::Target>;

    /// Creates the variable or overwrites its value.
    async fn upsert(&self, target: &Self::Target, name: SecretName, value: &str) -> Result<()>;

    /// Human-readable name of the target for log lines.
    fn describe(&self, target: &Self::Target) -> String;
}
