use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself failed (network, DNS, TLS, undecodable body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String
    },
    #[error("Could not read [{path}]: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error
    }
}
