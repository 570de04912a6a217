use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::*, util};

pub use ::reqwest::{Method, StatusCode};

pub use ::reqwest::header::{ACCEPT, CONTENT_TYPE};

/// Sent on every request when an API key is configured.
pub const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Where the runner service lives and how to authenticate to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// Every resource path (e.g. `/runs/`) is appended to this URL.
    pub base_url: Url,
    pub api_key: Option<String>,
}

impl Endpoint {
    pub const DEFAULT_BASE_URL: &str = "http://localhost/jobe/index.php/restapi";

    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn resource_url(&self, path: &str) -> Result<Url> {
        util::join_url(&self.base_url, path)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(Url::parse(Self::DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL must be valid"))
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Resource path relative to the endpoint's base URL.
    pub path: String,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

macro_rules! emit_request_fn {
    ($name:ident, $method:ident) => {
        pub fn $name(path: impl Into<String>) -> Self {
            Self::new(Method::$method, path)
        }
    };
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    emit_request_fn!(get, GET);
    emit_request_fn!(head, HEAD);
    emit_request_fn!(post, POST);
    emit_request_fn!(put, PUT);

    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeaderValue {
            name: name.clone(),
            source: e,
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// A single request/response exchange with the runner service.
///
/// Implementations must be stateless per call so that concurrent submissions
/// can share one instance.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] over a real HTTP connection.
#[derive(Clone)]
pub struct Client {
    inner: ::reqwest::Client,
    endpoint: Endpoint,
}

impl Client {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let inner = ::reqwest::Client::builder().gzip(true).build()?;
        Ok(Self { inner, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(crate) fn build_request(&self, req: HttpRequest) -> Result<::reqwest::Request> {
        let url = self.endpoint.resource_url(&req.path)?;
        let mut headers = req.headers;
        if let Some(key) = &self.endpoint.api_key {
            let value = HeaderValue::from_str(key).map_err(|e| Error::InvalidHeaderValue {
                name: X_API_KEY,
                source: e,
            })?;
            headers.insert(X_API_KEY, value);
        }
        let mut builder = self.inner.request(req.method, url).headers(headers);
        if let Some(body) = req.body {
            builder = builder.body(body);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let path = req.path.clone();
        let method = req.method.clone();
        let req = self.build_request(req)?;

        log::debug!("{} {}", method, req.url());
        let resp = self.inner.execute(req).await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;
        log::debug!("{} {} -> {}", method, path, status);

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new(Url::parse("http://localhost/jobe/index.php/restapi").unwrap())
    }

    #[test]
    fn request_url_is_appended_to_base_url() {
        let cli = Client::new(endpoint()).unwrap();
        let req = cli.build_request(HttpRequest::post("/runs/")).unwrap();
        assert_eq!(
            req.url().as_str(),
            "http://localhost/jobe/index.php/restapi/runs/"
        );
        assert_eq!(req.method(), Method::POST);
    }

    #[test]
    fn api_key_header_is_added_only_when_configured() {
        let cli = Client::new(endpoint()).unwrap();
        let req = cli.build_request(HttpRequest::get("/languages")).unwrap();
        assert!(req.headers().get("x-api-key").is_none());

        let cli = Client::new(endpoint().api_key("2AAA7A5415")).unwrap();
        let req = cli.build_request(HttpRequest::get("/languages")).unwrap();
        assert_eq!(req.headers().get("x-api-key").unwrap(), "2AAA7A5415");
    }

    #[test]
    fn request_headers_and_body_are_kept() {
        let cli = Client::new(endpoint()).unwrap();
        let req = HttpRequest::put("/files/abc")
            .header(CONTENT_TYPE, "application/json")
            .unwrap()
            .json(&serde_json::json!({ "file_contents": "aGk=" }))
            .unwrap();
        let req = cli.build_request(req).unwrap();
        assert_eq!(
            req.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"file_contents":"aGk="}"#);
    }

    #[test]
    fn invalid_header_value_is_an_error() {
        let err = HttpRequest::get("/languages")
            .header(ACCEPT, "bad\nvalue")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHeaderValue { name, .. } if name == ACCEPT));
    }
}
