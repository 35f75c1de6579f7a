/// Errors surfaced by the provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced a usable response.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected shape.
    #[error("provider response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
