//! Recording fake transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};

use super::client::HttpClient;

struct Route {
    method: Method,
    path: String,
    status: u16,
    body: String,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Answers requests from canned routes and remembers every call.
///
/// A route path may carry a query string, in which case it only matches
/// requests with exactly that query. Unrouted requests get a 404.
pub(crate) struct MockHttp {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made with `method` only.
    pub fn calls_with(&self, method: Method) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    fn lookup(&self, method: &Method, url: &Url) -> (u16, String) {
        let full = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .filter(|r| &r.method == method)
            .find(|r| r.path == full)
            .or_else(|| {
                routes
                    .iter()
                    .filter(|r| &r.method == method)
                    .find(|r| r.path == url.path())
            })
            .map(|r| (r.status, r.body.clone()))
            .unwrap_or((404, r#"{"errors":["not found"]}"#.to_string()))
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let body = req
            .body()
            .and_then(|b| b.as_bytes())
            .and_then(|b| serde_json::from_slice(b).ok());
        self.calls.lock().unwrap().push(RecordedCall {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body,
        });

        let (status, body) = self.lookup(req.method(), req.url());
        let resp = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        Ok(Response::from(resp))
    }
}
