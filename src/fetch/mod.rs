//! HTTP plumbing shared by the remote stores.
//!
//! Requests are built with [`request`] / [`json_request`] and sent through
//! [`send`] or [`send_json`], which turn any non-2xx answer into a
//! [`RequestError::Status`].

mod auth;
mod basic;
mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use auth::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RequestError;

/// Appends percent-encoded path segments to an API base URL.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, RequestError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RequestError::BaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn request(method: Method, url: Url) -> Request {
    Request::new(method, url)
}

/// Builds a request carrying `body` serialized as JSON.
pub fn json_request<B: Serialize + ?Sized>(
    method: Method,
    url: Url,
    body: &B,
) -> Result<Request, RequestError> {
    let mut req = Request::new(method, url);
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(req)
}

/// Executes `req`, normalizing transport failures and non-2xx statuses.
///
/// The raw failure is only logged at debug level; the returned error carries
/// just the status line.
pub async fn send<C: HttpClient + ?Sized>(
    client: &C,
    req: Request,
) -> Result<Response, RequestError> {
    let method = req.method().clone();
    let url = req.url().clone();

    let resp = client.execute(req).await.map_err(|e| {
        debug!(%method, %url, error = ?e, "Full transport error for debugging");
        RequestError::from(e)
    })?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    debug!(%method, %url, status = status.as_u16(), %body, "Full error response for debugging");
    Err(RequestError::Status {
        status,
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

/// [`send`], then decode the body as `T`.
pub async fn send_json<C, T>(client: &C, req: Request) -> Result<T, RequestError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    Ok(send(client, req).await?.json::<T>().await?)
}
