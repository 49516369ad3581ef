//! Wire contract and transports
//!
//! One turn is one `POST` of a [`UssdRequest`] answered by a JSON body
//! carrying a `message`. The client attaches no meaning to the message;
//! there is no end-of-dialogue marker to look for.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UssdConfig;
use crate::error::{TransportFailure, UssdError, UssdResult};
use crate::session::UssdSession;

/// Request body of one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UssdRequest {
    pub session_id: Option<String>,
    pub phone_number: String,
    pub ussd_code: String,
    /// Empty on the opening turn
    pub text: String,
}

impl UssdRequest {
    /// Build the request for one turn of `session`
    pub fn for_turn(session: &UssdSession, text: impl Into<String>) -> Self {
        Self {
            session_id: Some(session.session_id().to_string()),
            phone_number: session.phone_number().to_string(),
            ussd_code: session.ussd_code().to_string(),
            text: text.into(),
        }
    }
}

/// Successful reply body; unknown fields are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdResponse {
    pub message: String,
}

/// Carries one turn to the backend
#[async_trait]
pub trait UssdTransport: Send + Sync {
    /// Perform a single exchange
    ///
    /// Implementations must not retry; a failed turn is retried by the
    /// operator, not the client.
    async fn exchange(&self, request: &UssdRequest) -> Result<UssdResponse, TransportFailure>;
}

/// HTTP/JSON transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_url: String,
    connect_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the endpoint in `config`
    pub fn new(config: &UssdConfig) -> UssdResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| UssdError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            connect_timeout: config.connect_timeout,
        })
    }

    fn map_send_error(&self, error: reqwest::Error) -> TransportFailure {
        if error.is_timeout() {
            TransportFailure::Timeout {
                after: self.connect_timeout,
            }
        } else {
            TransportFailure::Network {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl UssdTransport for HttpTransport {
    async fn exchange(&self, request: &UssdRequest) -> Result<UssdResponse, TransportFailure> {
        debug!(
            "POST {} session={:?} text={:?}",
            self.api_url, request.session_id, request.text
        );

        let response = self
            .client
            .post(&self.api_url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(TransportFailure::from_status(
                status.as_u16(),
                String::from_utf8_lossy(&body),
            ));
        }

        serde_json::from_slice::<UssdResponse>(&body).map_err(|e| TransportFailure::MalformedResponse {
            reason: e.to_string(),
        })
    }
}
