use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that stamps a fixed set of headers (the API
/// token and the content type the API expects) onto every request.
pub struct ApiKey<C> {
    pub inner: C,
    headers: HeaderMap,
}

impl<C> ApiKey<C> {
    /// Sends `key` verbatim in the header called `header_name`
    /// (e.g. CircleCI's `circle-token`).
    pub fn header(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid header name '{header_name}'"))?;
        let mut headers = HeaderMap::new();
        headers.insert(name, sensitive_value(key)?);
        Ok(Self { inner, headers })
    }

    /// Uses `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, sensitive_value(&format!("Bearer {key}"))?);
        Ok(Self { inner, headers })
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }
}

fn sensitive_value(raw: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(raw).context("api token is not a valid header value")?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            req.headers_mut().insert(name.clone(), value.clone());
        }
        self.inner.execute(req).await
    }
}
