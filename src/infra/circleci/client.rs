use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fetch::{self, ApiKey, BasicClient, HttpClient};
use crate::secrets::SecretName;
use crate::services::VariableStore;

pub const DEFAULT_API_URL: &str = "https://circleci.com/api/v2/";
pub const TOKEN_ENV: &str = "CIRCLE_CI_API_TOKEN";

/// The subset of a CircleCI project descriptor we rely on.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// `<vcs>/<org>/<project>`, e.g. `gh/acme/infra`.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub organization_name: Option<String>,
}

#[derive(Serialize)]
struct EnvVarRequest<'a> {
    name: &'a str,
    value: &'a str,
}

pub struct CircleCiClient<C> {
    http: C,
    base_url: Url,
}

impl CircleCiClient<ApiKey<BasicClient>> {
    /// Client authenticating with a personal API token via `circle-token`.
    pub fn connect(token: &str, base_url: Url) -> Result<Self> {
        let http = ApiKey::header(BasicClient::new()?, "circle-token", token)?
            .with_content_type("application/json");
        Ok(Self::new(http, base_url))
    }
}

impl<C: HttpClient> CircleCiClient<C> {
    pub fn new(http: C, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Projects are addressed by name directly; only GitHub-hosted
    /// projects (`gh`) are supported.
    pub async fn get_project(&self, organization: &str, project: &str) -> Result<Project> {
        let url = fetch::endpoint(&self.base_url, &["project", "gh", organization, project])?;
        fetch::send_json(&self.http, fetch::request(Method::GET, url))
            .await
            .with_context(|| {
                format!("Failed to find project {project} in organization {organization}")
            })
    }

    /// Creates `name` or overwrites it; CircleCI keys variables by name.
    ///
    /// Only the status decides success. The echoed body (a masked copy of
    /// the variable) is not read.
    pub async fn put_env_var(&self, project_slug: &str, name: &str, value: &str) -> Result<()> {
        let mut segments = vec!["project"];
        segments.extend(project_slug.split('/'));
        segments.push("envvar");
        let url = fetch::endpoint(&self.base_url, &segments)?;

        let req = fetch::json_request(Method::POST, url, &EnvVarRequest { name, value })?;
        fetch::send(&self.http, req).await.with_context(|| {
            format!("Failed to update environment variable {name} in project {project_slug}")
        })?;

        info!(variable = name, project = project_slug, "Successfully updated environment variable");
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClient> VariableStore for CircleCiClient<C> {
    type Target = Project;

    async fn resolve(&self, organization: &str, name: &str) -> Result<Project> {
        self.get_project(organization, name).await
    }

    async fn upsert(&self, target: &Project, name: SecretName, value: &str) -> Result<()> {
        self.put_env_var(&target.slug, name.as_str(), value).await
    }

    fn describe(&self, target: &Project) -> String {
        format!("project {}", target.slug)
    }
}
