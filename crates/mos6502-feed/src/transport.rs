use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::protocol::{DisasmRequest, RawResponse};
use crate::ClientError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9999/";

/// One request/response exchange with the disassembly service.
pub trait Transport {
    fn post(&self, request: &DisasmRequest<'_>) -> Result<RawResponse, ClientError>;
}

/// Blocking HTTP transport. No timeout and no retries: a hung service hangs the caller.
pub struct HttpTransport {
    endpoint: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|source| ClientError::Transport { endpoint: endpoint.clone(), source })?;
        Ok(Self { endpoint, client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &DisasmRequest<'_>) -> Result<RawResponse, ClientError> {
        let transport_err = |source| ClientError::Transport { endpoint: self.endpoint.clone(), source };
        debug!(endpoint = %self.endpoint, bytes = request.data.len(), "posting disassembly request");
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(transport_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(transport_err)?;
        debug!(status, len = body.len(), "received response");
        Ok(RawResponse { status, body })
    }
}
