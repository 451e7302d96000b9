//! Turning operation outcomes into wire responses.

use palapa_protocol::{ProtocolError, Receipt, Response};
use palapa_room::EscrowError;

/// Wraps the outcome of one request.
pub(crate) fn to_response(id: u64, outcome: Result<Receipt, EscrowError>) -> Response {
    match outcome {
        Ok(receipt) => Response::Ok { id, receipt },
        Err(err) => error_response(id, &err),
    }
}

/// The wire form of an [`EscrowError`].
pub(crate) fn error_response(id: u64, err: &EscrowError) -> Response {
    Response::Error {
        id,
        code: err.code(),
        name: err.name().to_string(),
        kind: err.kind(),
        message: err.to_string(),
    }
}

/// The reply to bytes that never became a request.
pub(crate) fn rejected(err: &ProtocolError) -> Response {
    Response::Rejected {
        message: err.to_string(),
    }
}
