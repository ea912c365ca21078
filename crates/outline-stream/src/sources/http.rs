//! HTTP event-stream source for a deployed outline generation service.

use std::time::Duration;

use futures::StreamExt as _;
use tracing::debug;

use crate::errors::{SourceError, StreamError};
use crate::source::{OutlineSource, SourceStreamHandle, StreamRequest};

/// Configuration for the HTTP outline source.
#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    /// Base URL of the generation service.
    pub base_url: String,
    /// HTTP timeout covering the whole stream.
    pub timeout: Duration,
}

impl HttpSourceConfig {
    /// Creates a config with sensible defaults and a provided base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Builds a config from `OUTLINE_API_BASE_URL`.
    pub fn from_env() -> Result<Self, StreamError> {
        let base_url = std::env::var("OUTLINE_API_BASE_URL").unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(StreamError::Config(
                "missing OUTLINE_API_BASE_URL for HTTP outline source".into(),
            ));
        }
        Ok(Self::new(base_url))
    }

    /// Overrides the stream timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn stream_url(&self) -> String {
        format!(
            "{}/api/v1/outlines/stream",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// `OutlineSource` backed by the service's `text/event-stream` endpoint.
///
/// One POST per session; no retry or resume on a dropped connection.
pub struct HttpOutlineSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpOutlineSource {
    /// Creates a source from explicit configuration.
    pub fn new(config: HttpSourceConfig) -> Result<Self, StreamError> {
        if config.base_url.trim().is_empty() {
            return Err(StreamError::Config(
                "HTTP source base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StreamError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a source using `OUTLINE_API_BASE_URL`.
    pub fn from_env() -> Result<Self, StreamError> {
        Self::new(HttpSourceConfig::from_env()?)
    }
}

pub(crate) fn build_request_body(request: &StreamRequest) -> serde_json::Value {
    serde_json::json!({
        "threadId": format!("thread-{}", request.session_id),
        "runId": format!("run-{}", request.session_id),
        "state": {},
        "messages": [{
            "id": request.document_id.as_str(),
            "role": "user",
            "content": "",
        }],
        "tools": [],
        "context": [],
        "forwardedProps": {},
    })
}

#[async_trait::async_trait]
impl OutlineSource for HttpOutlineSource {
    async fn open(&self, request: StreamRequest) -> Result<SourceStreamHandle, SourceError> {
        debug!(
            document_id = %request.document_id,
            session_id = %request.session_id,
            "opening outline event stream"
        );
        let body = build_request_body(&request);
        let response = self
            .client
            .post(self.config.stream_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::transport(format!("outline stream request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SourceError::status(status.as_u16(), body));
        }
        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| SourceError::transport(format!("outline stream read failed: {e}")))
        });
        Ok(SourceStreamHandle {
            stream: Box::pin(stream),
        })
    }
}
