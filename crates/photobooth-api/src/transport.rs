//! HTTP transport abstraction, the `reqwest` transport and a scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::ApiError;

/// HTTP verbs used by the photobooth API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the canonical verb string.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Which requests may carry session cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialsPolicy {
    /// Attach cookies only when the target shares the configured origin.
    #[default]
    SameOrigin,
    /// Never attach cookies.
    Omit,
}

/// Fully resolved request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Absolute target URL.
    pub url: Url,
    /// Header list after default/caller merge.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
    /// Cookie scope for this request.
    pub credentials: CredentialsPolicy,
}

impl HttpRequest {
    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the request body as JSON, if any.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|raw| serde_json::from_slice(raw).ok())
    }
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Builds a response with a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by [`crate::ApiClient`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] when the request never produced a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Returns `true` when both URLs share scheme, host and port.
pub fn same_origin(left: &Url, right: &Url) -> bool {
    left.origin() == right.origin()
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Url,
    cookies: Option<String>,
}

impl ReqwestTransport {
    /// Creates a transport bound to `origin`.
    ///
    /// `cookies` is the raw `Cookie` header forwarded on same-origin requests.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] when the HTTP client cannot be built.
    pub fn new(origin: Url, cookies: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("photobooth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| ApiError::InvalidConfig(format!("client build failed: {error}")))?;

        Ok(Self {
            client,
            origin,
            cookies,
        })
    }

    fn attaches_cookies(&self, request: &HttpRequest) -> bool {
        request.credentials == CredentialsPolicy::SameOrigin
            && same_origin(&self.origin, &request.url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = self.cookies.as_deref()
            && self.attaches_cookies(&request)
        {
            builder = builder.header(reqwest::header::COOKIE, cookies);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| ApiError::Network(format!("request failed: {error}")))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| ApiError::Network(format!("reading body failed: {error}")))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Deterministic in-memory transport for tests and offline runs.
///
/// Responses are scripted per `(method, path)`; the last scripted response of
/// a route repeats once its queue is drained. Unscripted routes answer `404`.
/// Every request is recorded for later inspection.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<ScriptedRoute>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[derive(Debug)]
struct ScriptedRoute {
    method: HttpMethod,
    path: String,
    replies: VecDeque<Result<HttpResponse, ApiError>>,
}

impl ScriptedTransport {
    /// Creates a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply for `method path`.
    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: serde_json::Value) {
        self.push(method, path, Ok(HttpResponse::json(status, &body)));
    }

    /// Queues a raw reply for `method path`.
    pub fn respond_raw(&self, method: HttpMethod, path: &str, response: HttpResponse) {
        self.push(method, path, Ok(response));
    }

    /// Queues a transport failure for `method path`.
    pub fn fail(&self, method: HttpMethod, path: &str, error: ApiError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: HttpMethod, path: &str, reply: Result<HttpResponse, ApiError>) {
        let mut routes = self.routes.lock().unwrap_or_else(|poison| poison.into_inner());
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(ScriptedRoute {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Returns requests whose URL path equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let path = request.url.path().to_string();
        let method = request.method;
        self.requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(request);

        let mut routes = self.routes.lock().unwrap_or_else(|poison| poison.into_inner());
        let Some(route) = routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        else {
            return Ok(HttpResponse::json(
                404,
                &serde_json::json!({ "detail": "Not found." }),
            ));
        };

        if route.replies.len() > 1 {
            route
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("script exhausted".to_string())))
        } else {
            route
                .replies
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::Network("script exhausted".to_string())))
        }
    }
}
