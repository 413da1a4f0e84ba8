use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a fully built request. Every remote call in the crate goes
/// through this seam so wrappers (auth headers) and fakes can stack on it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
