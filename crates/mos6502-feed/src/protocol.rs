use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Request body: `{"data": [b0, b1, ...]}` in file order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DisasmRequest<'a> {
    pub data: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisasmResponse {
    pub disassembly: Vec<String>,
}

/// Status and body as the service returned them, before any JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// The listing lines in service order. The status code is not inspected;
    /// a body that does not carry a `disassembly` array is a protocol error.
    pub fn disassembly(&self) -> Result<Vec<String>, ClientError> {
        let resp: DisasmResponse = serde_json::from_str(&self.body).map_err(|source| ClientError::Protocol {
            status: self.status,
            source,
        })?;
        Ok(resp.disassembly)
    }
}
