//! Request envelope and error classification.

use super::BotApi;
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use telepoll_core::error::TransportError;
use tracing::{debug, error};

/// Deadline for ordinary (non long-poll) calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Every Bot API reply is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    pub retry_after: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope into the result or a [`TransportError`].
    pub(crate) fn into_result(self, http_status: u16) -> Result<T, TransportError> {
        if !self.ok {
            return Err(TransportError::Api {
                code: self.error_code.unwrap_or(i64::from(http_status)),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
                retry_after: self.parameters.and_then(|p| p.retry_after),
            });
        }
        self.result
            .ok_or_else(|| TransportError::Malformed("ok response without result".into()))
    }
}

/// Decode a raw reply body.
pub(crate) fn decode<T: DeserializeOwned>(
    http_status: u16,
    body: &[u8],
) -> Result<T, TransportError> {
    let envelope: ApiResponse<T> = serde_json::from_slice(body).map_err(|e| {
        TransportError::Malformed(format!("HTTP {http_status}: {e}"))
    })?;
    envelope.into_result(http_status)
}

impl BotApi {
    /// Post `params` to `method` and decode the result.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
        timeout: Duration,
    ) -> Result<T, TransportError> {
        debug!("{method}({params})");

        let resp = self
            .client
            .post(self.url(method))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("{method}: {}", e.without_url())))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("{method}: {}", e.without_url())))?;

        let result = decode(status, &body);
        match &result {
            Ok(_) => debug!("{method}: ok ({} bytes)", body.len()),
            Err(e) => error!("{method}: {e}"),
        }
        result
    }
}
