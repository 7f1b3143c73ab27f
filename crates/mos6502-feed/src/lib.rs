pub mod hexdump;
pub mod protocol;
pub mod session;
pub mod transport;

pub use protocol::{DisasmRequest, DisasmResponse, RawResponse};
pub use transport::{HttpTransport, Transport, DEFAULT_ENDPOINT};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("cannot reach disassembly service at {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from disassembly service (status {status}): {source}")]
    Protocol {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
