use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Method, Url};
use tracing::{debug, info};

use super::types::{Document, Envelope, NewVariable, ValueOnly, Variable, VariableUpdate, Workspace};
use crate::error::SyncError;
use crate::fetch::{self, ApiKey, BasicClient, HttpClient};
use crate::secrets::SecretName;
use crate::services::VariableStore;

pub const DEFAULT_API_URL: &str = "https://app.terraform.io/api/v2/";
pub const TOKEN_ENV: &str = "TF_API_TOKEN";

const PAGE_SIZE: &str = "100";

/// A resolved workspace plus the `env` variables it held at resolve time.
///
/// The snapshot is not refreshed while the secrets are upserted.
#[derive(Debug, Clone)]
pub struct WorkspaceTarget {
    pub workspace: Workspace,
    pub snapshot: Vec<Variable>,
}

/// What an upsert turns into for one key.
#[derive(Debug, PartialEq, Eq)]
pub enum UpsertAction<'a> {
    Update(&'a Variable),
    Create,
}

/// Picks update-by-id when the snapshot already has an `env` variable
/// called `key`, create otherwise.
pub fn plan_upsert<'a>(snapshot: &'a [Variable], key: &str) -> UpsertAction<'a> {
    snapshot
        .iter()
        .find(|v| v.attributes.key == key && v.is_env())
        .map(UpsertAction::Update)
        .unwrap_or(UpsertAction::Create)
}

/// Exact, case-sensitive name match.
pub fn match_workspace<'a>(workspaces: &'a [Workspace], name: &str) -> Option<&'a Workspace> {
    workspaces.iter().find(|w| w.attributes.name == name)
}

pub struct TerraformClient<C> {
    http: C,
    base_url: Url,
}

impl TerraformClient<ApiKey<BasicClient>> {
    /// Client authenticating with a user or team token as a bearer token.
    pub fn connect(token: &str, base_url: Url) -> Result<Self> {
        let http = ApiKey::bearer(BasicClient::new()?, token)?
            .with_content_type("application/vnd.api+json");
        Ok(Self::new(http, base_url))
    }
}

impl<C: HttpClient> TerraformClient<C> {
    pub fn new(http: C, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Lists every workspace in `organization`, following pagination links.
    pub async fn list_workspaces(&self, organization: &str) -> Result<Vec<Workspace>> {
        let mut url = fetch::endpoint(&self.base_url, &["organizations", organization, "workspaces"])?;
        url.query_pairs_mut().append_pair("page[size]", PAGE_SIZE);

        let mut workspaces = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            seen.insert(url.clone());
            let page: Document<Vec<Workspace>> =
                fetch::send_json(&self.http, fetch::request(Method::GET, url))
                    .await
                    .with_context(|| format!("Failed to list workspaces in organization {organization}"))?;
            debug!(organization, count = page.data.len(), "Fetched workspace page");
            workspaces.extend(page.data);

            if let Some(link) = page.links.and_then(|l| l.next) {
                let link = Url::parse(&link).context("invalid pagination link")?;
                if seen.contains(&link) {
                    bail!("pagination link repeats an already fetched page: {link}");
                }
                next = Some(link);
            }
        }

        Ok(workspaces)
    }

    pub async fn find_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        let workspaces = self.list_workspaces(organization).await?;
        match match_workspace(&workspaces, name) {
            Some(workspace) => Ok(workspace.clone()),
            None => Err(SyncError::ResourceNotFound {
                kind: "workspace",
                organization: organization.to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Snapshot of the workspace's `env` variables; terraform variables are
    /// left out.
    pub async fn list_env_variables(&self, workspace_id: &str) -> Result<Vec<Variable>> {
        let url = fetch::endpoint(&self.base_url, &["workspaces", workspace_id, "vars"])?;
        let doc: Document<Vec<Variable>> =
            fetch::send_json(&self.http, fetch::request(Method::GET, url))
                .await
                .with_context(|| format!("Failed to list variables of workspace {workspace_id}"))?;

        Ok(doc.data.into_iter().filter(Variable::is_env).collect())
    }

    /// Overwrites the value of an existing variable, addressed by its id.
    pub async fn update_variable(
        &self,
        workspace_id: &str,
        existing: &Variable,
        value: &str,
    ) -> Result<()> {
        let url = fetch::endpoint(&self.base_url, &["workspaces", workspace_id, "vars", existing.id.as_str()])?;
        let body = Envelope {
            data: VariableUpdate {
                kind: &existing.kind,
                id: &existing.id,
                attributes: ValueOnly { value },
            },
        };
        fetch::send(&self.http, fetch::json_request(Method::PATCH, url, &body)?).await?;
        Ok(())
    }

    /// Creates a sensitive, non-HCL `env` variable.
    pub async fn create_variable(&self, workspace_id: &str, key: &str, value: &str) -> Result<()> {
        let url = fetch::endpoint(&self.base_url, &["workspaces", workspace_id, "vars"])?;
        let body = Envelope {
            data: NewVariable::env(key, value),
        };
        fetch::send(&self.http, fetch::json_request(Method::POST, url, &body)?).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClient> VariableStore for TerraformClient<C> {
    type Target = WorkspaceTarget;

    async fn resolve(&self, organization: &str, name: &str) -> Result<WorkspaceTarget> {
        let workspace = self.find_workspace(organization, name).await?;
        let snapshot = self.list_env_variables(&workspace.id).await?;
        debug!(workspace = %workspace.id, existing = snapshot.len(), "Captured variable snapshot");
        Ok(WorkspaceTarget { workspace, snapshot })
    }

    async fn upsert(&self, target: &WorkspaceTarget, name: SecretName, value: &str) -> Result<()> {
        let workspace_id = &target.workspace.id;
        let result = match plan_upsert(&target.snapshot, name.as_str()) {
            UpsertAction::Update(existing) => {
                self.update_variable(workspace_id, existing, value).await
            }
            UpsertAction::Create => self.create_variable(workspace_id, name.as_str(), value).await,
        };
        result.with_context(|| {
            format!(
                "Failed to update environment variable {name} in workspace {}",
                target.workspace.attributes.name
            )
        })?;

        info!(
            variable = name.as_str(),
            workspace = %target.workspace.attributes.name,
            "Successfully updated environment variable"
        );
        Ok(())
    }

    fn describe(&self, target: &WorkspaceTarget) -> String {
        format!("workspace {}", target.workspace.attributes.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockHttp;
    use crate::infra::terraform::types::{VariableAttributes, WorkspaceAttributes};
    use serde_json::json;
    use std::sync::Arc;

    const WORKSPACES: &str = r#"{
        "data": [
            {"id": "ws-111", "type": "workspaces", "attributes": {"name": "staging"}},
            {"id": "ws-222", "type": "workspaces", "attributes": {"name": "prod"}}
        ],
        "links": {"next": null}
    }"#;

    fn client(mock: &Arc<MockHttp>) -> TerraformClient<Arc<MockHttp>> {
        TerraformClient::new(mock.clone(), "https://tfe.test/api/v2/".parse().unwrap())
    }

    fn var(id: &str, key: &str, category: &str) -> Variable {
        Variable {
            id: id.into(),
            kind: "vars".into(),
            attributes: VariableAttributes {
                key: key.into(),
                category: category.into(),
            },
        }
    }

    fn target(snapshot: Vec<Variable>) -> WorkspaceTarget {
        WorkspaceTarget {
            workspace: Workspace {
                id: "ws-222".into(),
                attributes: WorkspaceAttributes { name: "prod".into() },
            },
            snapshot,
        }
    }

    #[test]
    fn test_plan_upsert_updates_existing_env_var() {
        let snapshot = vec![var("var-1", "AWS_ACCESS_KEY_ID", "env")];
        assert_eq!(
            plan_upsert(&snapshot, "AWS_ACCESS_KEY_ID"),
            UpsertAction::Update(&snapshot[0])
        );
    }

    #[test]
    fn test_plan_upsert_ignores_terraform_category() {
        let snapshot = vec![var("var-1", "AWS_ACCESS_KEY_ID", "terraform")];
        assert_eq!(plan_upsert(&snapshot, "AWS_ACCESS_KEY_ID"), UpsertAction::Create);
    }

    #[test]
    fn test_plan_upsert_creates_when_absent() {
        let snapshot = vec![var("var-1", "OTHER", "env")];
        assert_eq!(plan_upsert(&snapshot, "AWS_SESSION_TOKEN"), UpsertAction::Create);
    }

    #[tokio::test]
    async fn test_resolve_exact_match_and_snapshot() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(Method::GET, "/api/v2/organizations/acme/workspaces", 200, WORKSPACES);
        mock.respond(
            Method::GET,
            "/api/v2/workspaces/ws-222/vars",
            200,
            r#"{"data": [
                {"id": "var-1", "type": "vars", "attributes": {"key": "AWS_ACCESS_KEY_ID", "category": "env"}},
                {"id": "var-2", "type": "vars", "attributes": {"key": "region", "category": "terraform"}}
            ]}"#,
        );

        let target = client(&mock).resolve("acme", "prod").await.unwrap();

        assert_eq!(target.workspace.id, "ws-222");
        assert_eq!(target.snapshot, vec![var("var-1", "AWS_ACCESS_KEY_ID", "env")]);
        assert_eq!(mock.calls()[0].url.query(), Some("page%5Bsize%5D=100"));
    }

    #[tokio::test]
    async fn test_resolve_without_match_is_not_found() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(Method::GET, "/api/v2/organizations/acme/workspaces", 200, WORKSPACES);

        let err = client(&mock).resolve("acme", "Prod").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ResourceNotFound { name, .. }) if name == "Prod"
        ));
        // No snapshot fetch once the lookup failed.
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_workspaces_follows_next_link() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(
            Method::GET,
            "/api/v2/organizations/acme/workspaces",
            200,
            r#"{
                "data": [{"id": "ws-1", "attributes": {"name": "a"}}],
                "links": {"next": "https://tfe.test/api/v2/organizations/acme/workspaces?page=2"}
            }"#,
        );
        mock.respond(
            Method::GET,
            "/api/v2/organizations/acme/workspaces?page=2",
            200,
            r#"{"data": [{"id": "ws-2", "attributes": {"name": "b"}}], "links": {"next": null}}"#,
        );

        let workspaces = client(&mock).list_workspaces("acme").await.unwrap();

        let ids: Vec<_> = workspaces.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["ws-1", "ws-2"]);
    }

    #[tokio::test]
    async fn test_list_workspaces_rejects_repeating_next_link() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(
            Method::GET,
            "/api/v2/organizations/acme/workspaces",
            200,
            r#"{
                "data": [],
                "links": {"next": "https://tfe.test/api/v2/organizations/acme/workspaces?page%5Bsize%5D=100"}
            }"#,
        );

        let err = client(&mock).list_workspaces("acme").await.unwrap_err();

        assert!(err.to_string().contains("pagination link repeats"));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_patches_existing_variable() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(Method::PATCH, "/api/v2/workspaces/ws-222/vars/var-9", 200, "{}");
        let target = target(vec![var("var-9", "AWS_ACCESS_KEY_ID", "env")]);

        client(&mock)
            .upsert(&target, SecretName::AwsAccessKeyId, "AKIANEW")
            .await
            .unwrap();

        assert!(mock.calls_with(Method::POST).is_empty());
        let patches = mock.calls_with(Method::PATCH);
        assert_eq!(patches.len(), 1);
        assert_eq!(
            patches[0].body,
            Some(json!({"data": {"type": "vars", "id": "var-9", "attributes": {"value": "AKIANEW"}}}))
        );
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_variable() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(Method::POST, "/api/v2/workspaces/ws-222/vars", 201, "{}");

        client(&mock)
            .upsert(&target(vec![]), SecretName::AwsSessionToken, "tok")
            .await
            .unwrap();

        assert!(mock.calls_with(Method::PATCH).is_empty());
        let posts = mock.calls_with(Method::POST);
        assert_eq!(posts.len(), 1);
        let attributes = &posts[0].body.as_ref().unwrap()["data"]["attributes"];
        assert_eq!(attributes["key"], "AWS_SESSION_TOKEN");
        assert_eq!(attributes["category"], "env");
        assert_eq!(attributes["hcl"], false);
        assert_eq!(attributes["sensitive"], true);
    }

    #[tokio::test]
    async fn test_upsert_failure_propagates() {
        let mock = Arc::new(MockHttp::new());
        mock.respond(Method::POST, "/api/v2/workspaces/ws-222/vars", 422, "{}");

        let err = client(&mock)
            .upsert(&target(vec![]), SecretName::AwsSecretAccessKey, "s")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to update environment variable AWS_SECRET_ACCESS_KEY in workspace prod"
        );
    }
}
