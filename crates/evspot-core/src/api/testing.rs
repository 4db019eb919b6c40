//! Recording transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderValue};
use reqwest::{StatusCode, Url};

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::{ApiClient, ApiError};

pub(crate) const BASE_URL: &str = "http://localhost:8000/";

struct Scripted {
    result: Result<ApiResponse, ApiError>,
    set_cookie: Option<String>,
}

/// Replays scripted responses in order and records every request.
/// Running out of scripted responses yields a network error.
///
/// Like reqwest, it sends the cookies the store holds for the request URL
/// and stores cookies set by scripted responses.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
    cookies: Option<Arc<dyn CookieStore>>,
}

impl MockTransport {
    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.script(status, body, None);
    }

    /// Respond and set a cookie, as a `Set-Cookie` header would
    pub(crate) fn respond_with_cookie(&self, status: u16, body: &str, set_cookie: &str) {
        self.script(status, body, Some(set_cookie.to_string()));
    }

    fn script(&self, status: u16, body: &str, set_cookie: Option<String>) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.responses.lock().unwrap().push_back(Scripted {
            result: Ok(ApiResponse::new(status, body)),
            set_cookie,
        });
    }

    pub(crate) fn fail(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Scripted {
            result: Err(ApiError::Network(message.to_string())),
            set_cookie: None,
        });
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn execute(&self, mut request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        if let Some(ref cookies) = self.cookies {
            if let Some(value) = cookies.cookies(&request.url) {
                request.headers.insert(header::COOKIE, value);
            }
        }
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        let result = match next {
            Some(scripted) => {
                if let (Some(cookies), Some(set_cookie)) = (&self.cookies, scripted.set_cookie) {
                    set_cookies(&**cookies, &set_cookie, &url);
                }
                scripted.result
            }
            None => Err(ApiError::Network("no scripted response".to_string())),
        };
        async move { result }.boxed()
    }
}

/// Store `set_cookie` as if `url` had answered with it
pub(crate) fn set_cookies(store: &dyn CookieStore, set_cookie: &str, url: &Url) {
    let value = HeaderValue::from_str(set_cookie).expect("valid cookie header");
    store.set_cookies(&mut std::iter::once(&value), url);
}

/// Client wired to a mock transport, with or without a CSRF cookie
pub(crate) fn mock_client(csrf: Option<&str>) -> (ApiClient, Arc<MockTransport>) {
    mock_client_at(BASE_URL, csrf)
}

/// Same as `mock_client` for an API served at `base`
pub(crate) fn mock_client_at(base: &str, csrf: Option<&str>) -> (ApiClient, Arc<MockTransport>) {
    let jar = Arc::new(Jar::default());
    if let Some(token) = csrf {
        let url = Url::parse(base).unwrap();
        set_cookies(&*jar, &format!("csrftoken={}; Path=/", token), &url);
    }
    mock_client_over(base, jar)
}

/// Client and mock transport sharing the cookie store `cookies`
pub(crate) fn mock_client_over<C>(base: &str, cookies: Arc<C>) -> (ApiClient, Arc<MockTransport>)
where
    C: CookieStore + 'static,
{
    let base = Url::parse(base).unwrap();
    let transport = Arc::new(MockTransport {
        cookies: Some(cookies.clone()),
        ..Default::default()
    });
    let client = ApiClient::with_transport(base, transport.clone(), cookies);
    (client, transport)
}

pub(crate) fn header<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
