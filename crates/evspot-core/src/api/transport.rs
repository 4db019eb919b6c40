//! The HTTP seam under `ApiClient`.
//!
//! `ApiClient` builds fully-formed `ApiRequest`s (URL, headers, JSON body)
//! and hands them to a `Transport`. `HttpTransport` sends them with reqwest;
//! tests substitute a recording transport.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::ApiError;

/// One outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// Status and raw body of a response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

pub trait Transport: Send + Sync {
    /// Perform exactly one request. Transport failures map to
    /// `ApiError::Network`; any HTTP status is a successful result here.
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose cookies (session, `csrftoken`) live in `cookies`
    pub fn new<C: CookieStore + 'static>(cookies: Arc<C>) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_provider(cookies).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        async move {
            debug!(method = %request.method, url = %request.url, "Sending request");

            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            debug!(status = %status, bytes = body.len(), "Response received");
            Ok(ApiResponse { status, body })
        }
        .boxed()
    }
}
