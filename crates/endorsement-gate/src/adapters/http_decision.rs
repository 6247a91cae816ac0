//! # HTTP Decision Service Adapter
//!
//! POSTs the canonical JSON effect set to the configured endpoint and reads
//! the verdict from the response.
//!
//! ## Verdict Rules
//!
//! | Response                              | Result                            |
//! |---------------------------------------|-----------------------------------|
//! | non-2xx                               | `DecisionError::Status`           |
//! | 2xx, `{"approved": bool, ...}`        | as stated                         |
//! | 2xx, `approved` present but not bool  | `DecisionError::MalformedVerdict` |
//! | 2xx, body larger than the read cap    | `DecisionError::MalformedVerdict` |
//! | 2xx, any other body (`{"status":200}`) | approve on status                 |
//! | no response / timeout                 | `Transport` / `Timeout`           |

use crate::config::{ConfigError, DecisionServiceConfig};
use crate::domain::entities::Verdict;
use crate::ports::outbound::{DecisionError, DecisionService};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

/// Longest response body echoed back in an error.
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Most response bytes read from the service. A verdict fits easily.
pub(crate) const MAX_RESPONSE_BODY_BYTES: usize = 64 * 1024;

/// Decision service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDecisionService {
    client: Client,
    endpoint: Url,
    config: DecisionServiceConfig,
}

impl HttpDecisionService {
    /// Build a client for `config`, validating the endpoint.
    pub fn new(config: &DecisionServiceConfig) -> Result<Self, ConfigError> {
        let endpoint = config.validated_endpoint()?;

        let mut builder = Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            config: config.clone(),
        })
    }

    /// The validated endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn read_capped(&self, mut response: Response) -> Result<CappedBody, DecisionError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(e))?
        {
            let room = MAX_RESPONSE_BODY_BYTES - bytes.len();
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                return Ok(CappedBody {
                    bytes,
                    truncated: true,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(CappedBody {
            bytes,
            truncated: false,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> DecisionError {
        if err.is_timeout() {
            DecisionError::Timeout(
                self.config
                    .request_timeout
                    .unwrap_or(self.config.connect_timeout),
            )
        } else {
            DecisionError::Transport(err.to_string())
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// A response body read up to `MAX_RESPONSE_BODY_BYTES`.
struct CappedBody {
    bytes: Vec<u8>,
    truncated: bool,
}

impl CappedBody {
    fn lossy(&self) -> String {
        truncate(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Read a verdict out of a 2xx response body.
///
/// The 2xx status is the approval. A body only overrides it when it carries
/// an `approved` field.
pub(crate) fn interpret_verdict(body: &[u8]) -> Result<Verdict, DecisionError> {
    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
        return Ok(Verdict::approve());
    };
    if !fields.contains_key("approved") {
        return Ok(Verdict::approve());
    }
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        DecisionError::MalformedVerdict(format!(
            "{e}; body: {}",
            truncate(&String::from_utf8_lossy(body))
        ))
    })
}

#[async_trait]
impl DecisionService for HttpDecisionService {
    async fn evaluate(&self, effect_set_json: Vec<u8>) -> Result<Verdict, DecisionError> {
        debug!(
            "[decision] POST {} ({} bytes)",
            self.endpoint,
            effect_set_json.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(effect_set_json)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = self.read_capped(response).await?;

        if !status.is_success() {
            warn!("[decision] Service answered {}", status);
            return Err(DecisionError::Status {
                status: status.as_u16(),
                body: body.lossy(),
            });
        }
        if body.truncated {
            warn!(
                "[decision] Verdict body exceeds {} bytes",
                MAX_RESPONSE_BODY_BYTES
            );
            return Err(DecisionError::MalformedVerdict(format!(
                "body exceeds {MAX_RESPONSE_BODY_BYTES} bytes: {}",
                body.lossy()
            )));
        }

        interpret_verdict(&body.bytes)
    }
}
