//! In-memory transport for tool and registry tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{AdtRequest, AdtResponse, AdtTransport};
use crate::error::FetchError;

pub(crate) struct MockTransport {
    routes: HashMap<String, Result<Value, (u16, String)>>,
    delay: Option<Duration>,
    pub(crate) requests: Mutex<Vec<AdtRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: HashMap::new(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn route(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(path.to_string(), Ok(body));
        self
    }

    pub(crate) fn fail(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), Err((status, body.to_string())));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn sent(&self) -> Vec<AdtRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdtTransport for MockTransport {
    async fn send(&self, request: AdtRequest) -> Result<AdtResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.routes.get(&request.path) {
            Some(Ok(body)) => Ok(AdtResponse {
                status: 200,
                data: body.clone(),
            }),
            Some(Err((status, body))) => Err(FetchError::ApiError {
                status: *status,
                body: body.clone(),
            }),
            None => Err(FetchError::ApiError {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

/// Shares one mock between a registry and the test body.
#[async_trait]
impl AdtTransport for std::sync::Arc<MockTransport> {
    async fn send(&self, request: AdtRequest) -> Result<AdtResponse, FetchError> {
        (**self).send(request).await
    }
}
