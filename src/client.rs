use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::AdtConfig;
use crate::error::FetchError;
use crate::xml;

const CSRF_HEADER: &str = "x-csrf-token";
const DISCOVERY_PATH: &str = "/sap/bc/adt/discovery";

/// A single ADT call: method, server-relative path, query and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtRequest {
    pub method: AdtMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub accept: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdtMethod {
    Get,
    Post,
}

impl AdtRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(AdtMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(AdtMethod::Post, path)
    }

    fn new(method: AdtMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            accept: "*/*".into(),
            body: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A successful ADT response with its body already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct AdtResponse {
    pub status: u16,
    pub data: Value,
}

/// Sends ADT requests. Non-success statuses come back as
/// [`FetchError::ApiError`]; timeouts and network failures as
/// [`FetchError::Request`].
#[async_trait]
pub trait AdtTransport: Send + Sync {
    async fn send(&self, request: AdtRequest) -> Result<AdtResponse, FetchError>;
}

/// Blanket impl so `Box<dyn AdtTransport>` can be handed to the registry.
#[async_trait]
impl AdtTransport for Box<dyn AdtTransport> {
    async fn send(&self, request: AdtRequest) -> Result<AdtResponse, FetchError> {
        (**self).send(request).await
    }
}

/// ADT over HTTP with basic auth. Keeps the session cookie and CSRF token
/// the server hands out so modifying requests (POST) are accepted.
pub struct HttpTransport {
    client: reqwest::Client,
    config: AdtConfig,
    csrf_token: Mutex<Option<String>>,
}

impl HttpTransport {
    pub fn new(config: AdtConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: AdtConfig) -> Self {
        Self {
            client,
            config,
            csrf_token: Mutex::new(None),
        }
    }

    fn builder(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.config.base_url, path))
            .basic_auth(&self.config.username, Some(&self.config.password));
        if let Some(ref client) = self.config.client {
            builder = builder.query(&[("sap-client", client)]);
        }
        if let Some(ref language) = self.config.language {
            builder = builder.query(&[("sap-language", language)]);
        }
        builder
    }

    async fn csrf_token(&self) -> Result<String, FetchError> {
        let mut cached = self.csrf_token.lock().await;
        if let Some(ref token) = *cached {
            return Ok(token.clone());
        }

        let resp = self
            .builder(Method::GET, DISCOVERY_PATH)
            .header(CSRF_HEADER, "fetch")
            .header(ACCEPT, "application/atomsvc+xml")
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let token = resp
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FetchError::ApiError {
                status: resp.status().as_u16(),
                body: "server did not issue a CSRF token".into(),
            })?;

        debug!("fetched CSRF token");
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn attempt(&self, request: &AdtRequest) -> Result<reqwest::Response, FetchError> {
        let method = match request.method {
            AdtMethod::Get => Method::GET,
            AdtMethod::Post => Method::POST,
        };
        let mut builder = self
            .builder(method, &request.path)
            .query(&request.query)
            .header(ACCEPT, &request.accept);

        if request.method == AdtMethod::Post {
            builder = builder.header(CSRF_HEADER, self.csrf_token().await?);
        }
        if let Some(ref body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/xml")
                .body(body.clone());
        }

        builder
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[async_trait]
impl AdtTransport for HttpTransport {
    async fn send(&self, request: AdtRequest) -> Result<AdtResponse, FetchError> {
        debug!(method = ?request.method, path = %request.path, "ADT request");

        let mut resp = self.attempt(&request).await?;
        if resp.status() == StatusCode::FORBIDDEN && csrf_required(resp.headers()) {
            debug!("CSRF token rejected, refreshing");
            *self.csrf_token.lock().await = None;
            resp = self.attempt(&request).await?;
        }

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let text = resp
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(FetchError::ApiError { status, body: text });
        }

        debug!(status, content_type = %content_type, bytes = text.len(), "ADT response");
        Ok(AdtResponse {
            status,
            data: decode_body(&content_type, text)?,
        })
    }
}

fn csrf_required(headers: &HeaderMap) -> bool {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("required"))
}

/// XML becomes a tree, JSON is parsed, everything else stays text.
pub fn decode_body(content_type: &str, text: String) -> Result<Value, FetchError> {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("json") {
        return serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()));
    }
    if content_type.contains("xml") || text.trim_start().starts_with("<?xml") {
        return xml::parse(&text);
    }
    Ok(Value::String(text))
}
