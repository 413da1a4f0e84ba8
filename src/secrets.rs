//! The fixed set of AWS credentials copied into remote stores.

use std::env::VarError;
use std::fmt;

use crate::error::SyncError;

/// Names of the credentials that get synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretName {
    AwsAccessKeyId,
    AwsSecretAccessKey,
    AwsSessionToken,
}

impl SecretName {
    /// Every synced credential, in the order they are processed.
    pub const ALL: [SecretName; 3] = [
        SecretName::AwsAccessKeyId,
        SecretName::AwsSecretAccessKey,
        SecretName::AwsSessionToken,
    ];

    /// The variable key, identical locally and remotely.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretName::AwsAccessKeyId => "AWS_ACCESS_KEY_ID",
            SecretName::AwsSecretAccessKey => "AWS_SECRET_ACCESS_KEY",
            SecretName::AwsSessionToken => "AWS_SESSION_TOKEN",
        }
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential and the value found for it, if any.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub name: SecretName,
    value: Option<String>,
}

impl SecretEntry {
    /// Empty strings count as absent.
    pub fn new(name: SecretName, value: Option<String>) -> Self {
        Self {
            name,
            value: value.filter(|v| !v.is_empty()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Builds one entry per [`SecretName::ALL`] using `lookup` to find values.
    pub fn collect<F>(lookup: F) -> Vec<SecretEntry>
    where
        F: Fn(&str) -> Option<String>,
    {
        SecretName::ALL
            .iter()
            .map(|name| SecretEntry::new(*name, lookup(name.as_str())))
            .collect()
    }

    /// Like [`SecretEntry::collect`], but the lookup can reject a value.
    pub fn try_collect<F>(lookup: F) -> Result<Vec<SecretEntry>, SyncError>
    where
        F: Fn(SecretName) -> Result<Option<String>, SyncError>,
    {
        SecretName::ALL
            .iter()
            .map(|name| Ok(SecretEntry::new(*name, lookup(*name)?)))
            .collect()
    }

    /// Reads the credentials from the process environment. A value that is
    /// set but not valid UTF-8 is an error, not a skip.
    pub fn collect_from_env() -> Result<Vec<SecretEntry>, SyncError> {
        Self::try_collect(|name| env_value(name, std::env::var(name.as_str())))
    }
}

fn env_value(
    name: SecretName,
    raw: Result<String, VarError>,
) -> Result<Option<String>, SyncError> {
    match raw {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(SyncError::InvalidSecretValue(name)),
    }
}

// Values stay out of logs.
impl fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEntry")
            .field("name", &self.name)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
