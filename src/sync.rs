//! Resolve a target once, then upsert every present secret concurrently.

use std::sync::Arc;

use anyhow::Result;
use tracing::{Instrument, error, info, info_span};

use crate::error::SyncError;
use crate::secrets::{SecretEntry, SecretName};
use crate::services::VariableStore;

/// Outcome of a successful run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: Vec<SecretName>,
    pub skipped: Vec<SecretName>,
}

/// Resolves `resource` inside `organization` and syncs `entries` into it.
///
/// A failed resolution aborts before any upsert is attempted.
#[tracing::instrument(skip(store, entries))]
pub async fn run<S>(
    store: Arc<S>,
    organization: &str,
    resource: &str,
    entries: Vec<SecretEntry>,
) -> Result<SyncReport>
where
    S: VariableStore + 'static,
    S::Target: 'static,
{
    let target = store.resolve(organization, resource).await?;
    info!(resource = %store.describe(&target), "Resolved target");
    sync(store, Arc::new(target), entries).await
}

/// Upserts every entry with a value, all in flight at once.
///
/// Entries without a value are skipped and never sent. A failing upsert does
/// not stop the others; once all have settled, any failure turns the whole
/// sync into [`SyncError::UpsertFailed`]. Upserts that already succeeded are
/// not rolled back.
pub async fn sync<S>(
    store: Arc<S>,
    target: Arc<S::Target>,
    entries: Vec<SecretEntry>,
) -> Result<SyncReport>
where
    S: VariableStore + 'static,
    S::Target: 'static,
{
    let described = store.describe(&target);
    let mut report = SyncReport::default();
    let mut tasks = Vec::new();

    for entry in entries {
        let name = entry.name;
        let Some(value) = entry.value().map(str::to_owned) else {
            info!(variable = name.as_str(), "No value found for variable {name}. Skipping...");
            report.skipped.push(name);
            continue;
        };

        let store = store.clone();
        let target = target.clone();
        let span = info_span!("upsert", variable = name.as_str(), resource = %described);
        let task = tokio::spawn(
            async move { store.upsert(&target, name, &value).await }.instrument(span),
        );
        tasks.push((name, task));
    }

    let mut failed = Vec::new();
    for (name, task) in tasks {
        match task.await {
            Ok(Ok(())) => report.updated.push(name),
            Ok(Err(e)) => {
                let message = format!("{e:#}");
                error!(
                    variable = name.as_str(),
                    resource = %described,
                    error = %message,
                    "Upsert failed"
                );
                failed.push(name);
            }
            Err(e) => {
                error!(
                    variable = name.as_str(),
                    resource = %described,
                    error = %e,
                    "Upsert task aborted"
                );
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        return Err(SyncError::UpsertFailed { failed }.into());
    }

    info!(
        resource = %described,
        updated = report.updated.len(),
        skipped = report.skipped.len(),
        "Sync complete"
    );
    Ok(report)
}
