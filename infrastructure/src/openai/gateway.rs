//! Streaming gateway for OpenAI-compatible chat completion endpoints

use crate::openai::sse;
use async_trait::async_trait;
use chatflow_application::{CompletionGateway, CompletionRequest, GatewayError, StreamHandle};
use chatflow_domain::ContextMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Buffered events between the decoder task and the consumer.
const CHANNEL_CAPACITY: usize = 64;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire format of a streaming completion request.
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ContextMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

/// [`CompletionGateway`] adapter over an OpenAI-compatible HTTP endpoint.
///
/// Posts to `{base_url}/chat/completions` with `stream: true` and decodes
/// the SSE response body on a background task. The bearer token is injected
/// at construction; it is never read from the request.
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        let base_url = base_url.into();
        info!(endpoint = %base_url, "OpenAiGateway initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a gateway with an existing client (for testing)
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Endpoints differ in shape (`{"message": ..}` vs `{"error": {"message":
/// ..}}`); anything unparseable degrades to an empty detail.
fn error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<ErrorInner>,
    }

    #[derive(Deserialize)]
    struct ErrorInner {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or_else(|| b.error.and_then(|e| e.message)))
        .unwrap_or_default()
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn stream_chat(&self, request: CompletionRequest) -> Result<StreamHandle, GatewayError> {
        let body = WireRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: true,
        };

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "starting streaming completion"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(sse::pump(response.bytes_stream(), tx));

        Ok(StreamHandle::new(rx))
    }
}
