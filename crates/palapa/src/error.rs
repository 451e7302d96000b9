//! Unified error type for Palapa.

use palapa_protocol::ProtocolError;
use palapa_room::{ConfigError, EscrowError};

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PalapaError {
    /// Encoding, decoding, or key parsing failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation was rejected.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// The host was built with an unusable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
