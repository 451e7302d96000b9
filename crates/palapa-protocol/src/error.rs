//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or parsing protocol
/// values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unknown instruction tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A hex-encoded identity or address could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
