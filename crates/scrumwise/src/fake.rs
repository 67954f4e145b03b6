//! Scripted in-memory transport
//!
//! `FakeTransport` answers requests from a queue of canned responses and
//! records every request it receives. It lets the merge and queue logic run
//! end to end in tests or offline without a Scrumwise server.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{HttpRequest, HttpResponse, Transport};
use crate::error::{Result, ScrumwiseError};

enum Scripted {
    Response(HttpResponse),
    NetworkError(String),
}

#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Response(HttpResponse {
                status,
                body: body.into(),
            }));
    }

    /// A 200 response carrying only a data version, as write calls return.
    pub async fn push_ok(&self, data_version: i64) {
        self.push_response(200, json!({ "dataVersion": data_version }).to_string())
            .await;
    }

    /// A getData response wrapping `result`.
    pub async fn push_snapshot(&self, data_version: i64, result: Value) {
        self.push_response(
            200,
            json!({ "dataVersion": data_version, "result": result }).to_string(),
        )
        .await;
    }

    pub async fn push_status(&self, status: u16, body: impl Into<String>) {
        self.push_response(status, body).await;
    }

    pub async fn push_network_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::NetworkError(message.into()));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Transport for FakeTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().await.push(request.clone());
        debug!("[FakeTransport] GET {}", request.url);

        match self.script.lock().await.pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::NetworkError(message)) => Err(ScrumwiseError::Network {
                endpoint: request.endpoint.clone(),
                message,
            }),
            None => Err(ScrumwiseError::Network {
                endpoint: request.endpoint.clone(),
                message: "no scripted response left".to_string(),
            }),
        }
    }
}
