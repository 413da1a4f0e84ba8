//! JSON:API documents exchanged with Terraform Cloud.

use serde::{Deserialize, Serialize};

/// Variables are always written as environment variables.
pub const ENV_CATEGORY: &str = "env";
/// Values are plain strings, never HCL expressions.
pub const HCL: bool = false;
/// Synced credentials are write-only in the remote store.
pub const SENSITIVE: bool = true;

const VARS_TYPE: &str = "vars";

#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub attributes: WorkspaceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceAttributes {
    pub name: String,
}

/// An existing workspace variable, as seen in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variable {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: VariableAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariableAttributes {
    pub key: String,
    pub category: String,
}

impl Variable {
    pub fn is_env(&self) -> bool {
        self.attributes.category == ENV_CATEGORY
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct VariableUpdate<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub id: &'a str,
    pub attributes: ValueOnly<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValueOnly<'a> {
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewVariable<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: NewVariableAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct NewVariableAttributes<'a> {
    key: &'a str,
    value: &'a str,
    category: &'static str,
    hcl: bool,
    sensitive: bool,
}

impl<'a> NewVariable<'a> {
    pub fn env(key: &'a str, value: &'a str) -> Self {
        Self {
            kind: VARS_TYPE,
            attributes: NewVariableAttributes {
                key,
                value,
                category: ENV_CATEGORY,
                hcl: HCL,
                sensitive: SENSITIVE,
            },
        }
    }
}
