//! JSON-RPC 2.0 transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint {0}")]
    Endpoint(String),
    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// RPC request
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// RPC error
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResponse {
    /// A `null` result is a valid answer (e.g. a pending receipt).
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(err) => Err(RpcError::Node {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// One round trip to a ledger node.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RpcError> {
        let endpoint = Url::parse(endpoint).map_err(|e| RpcError::Endpoint(format!("{endpoint}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = RpcRequest::new(id, method, params);
        trace!("[RPC] -> {} #{}", method, id);

        let resp: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        trace!("[RPC] <- #{} ({})", id, if resp.error.is_some() { "error" } else { "ok" });
        resp.into_result()
    }
}
