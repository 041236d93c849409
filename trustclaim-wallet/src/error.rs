//! # Errors
//!
//! The claim pipeline's error taxonomy. No variant is retried internally:
//! signing is a one-shot custodian-mediated action, and the issuance
//! endpoints are not guaranteed idempotent (attestation nonces, issuance
//! dates). Every variant is caller-recoverable by restarting the pipeline
//! with a freshly built claim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the claim pipeline and query path.
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Eq)]
pub enum Error {
    /// A required input is missing — no issuer identifier, no connected
    /// signer account. Raised before any external call is made; the caller
    /// must fix the precondition (e.g. complete wallet connection) before
    /// retrying.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The external signer declined or failed to sign. Terminal for this
    /// invocation: timestamps and nonces inside the document may now be
    /// stale, so the caller must restart with a fresh claim.
    #[error("signing rejected: {0}")]
    SignerRejected(String),

    /// A non-success response from an issuance, attestation, or relay
    /// endpoint, surfaced with the remote payload or status.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// The claim document cannot be projected into a deterministic
    /// typed-data structure. A definition bug in the document, always fatal
    /// to the invocation.
    #[error("type projection failed: {0}")]
    TypeProjection(String),

    /// A malformed query or federated node failure. Returned as a
    /// structured error, never as a partial result.
    #[error("query failed: {0}")]
    Query(String),
}

impl From<trustclaim_eip712::Error> for Error {
    fn from(err: trustclaim_eip712::Error) -> Self {
        Self::TypeProjection(err.to_string())
    }
}

// manually implement serde::Serialize so errors render as their display
// string at the boundary
impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
