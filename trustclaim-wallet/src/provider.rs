//! # Provider
//!
//! The provider traits exported by this module are used to inject external
//! collaborators into the claim pipeline: the signer capability, the
//! issuance service client, the federated query client, and the session
//! store. Each trait is substitutable with a test double.
//!
//! The signer is deliberately an injected capability rather than an ambient
//! global: the pipeline selects exactly one signing operation per
//! invocation, based on the request's declared signature mode.

pub mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trustclaim_eip712::TypedData;

use crate::attestation::Eip712Signature;
use crate::claim::SignatureMode;
use crate::query::{QueryRequest, QueryResponse};

/// Result type used by all provider traits.
pub type Result<T> = anyhow::Result<T>;

/// The session store key holding the active issuer identifier.
pub const DID_KEY: &str = "did";

/// `WalletProvider` is the umbrella trait a wallet implementation supplies
/// to the claim pipeline.
pub trait WalletProvider:
    Signer + IssuerClient + QueryClient + SessionStore + Clone
{
}

/// The external signer capability: a browser wallet or a remote key
/// custodian. Signing is one-shot — a rejection is surfaced verbatim and
/// never retried, since some signers include per-request nonces or
/// timestamps inside the signed payload.
pub trait Signer: Send + Sync {
    /// Sign the typed-data payload with the given account's key, returning
    /// the hex-encoded signature.
    fn sign_typed_data(
        &self, account: &str, typed_data: &TypedData,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Sign raw message bytes (the JWS signing input) with the given
    /// account's key.
    fn sign_message(
        &self, account: &str, msg: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Sign a 32-byte typed-data digest with the held attestation key,
    /// returning the recoverable signature components.
    fn sign_digest(
        &self, digest: &[u8; 32],
    ) -> impl Future<Output = Result<Eip712Signature>> + Send;
}

/// `IssuerClient` is the wallet's client for the two-stage issuance
/// submission: a primary issuance/signing backend followed by the local
/// relay that persists the result.
pub trait IssuerClient: Send + Sync {
    /// Submit a credential issuance request to the primary backend. The
    /// path is selected by the signature mode.
    fn create_credential(
        &self, mode: SignatureMode, req: &CreateCredentialRequest,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Submit an attestation issuance request to the primary backend.
    fn create_attestation(
        &self, req: &CreateAttestationRequest,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Relay an intermediate issuance result to the local application
    /// endpoint.
    fn relay(
        &self, kind: RelayKind, req: &RelayRequest,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// `QueryClient` executes read queries against a federated graph-query
/// node. No mutation capability is exposed through this path.
pub trait QueryClient: Send + Sync {
    /// Execute the query and return the node's response.
    fn execute(&self, req: &QueryRequest) -> impl Future<Output = Result<QueryResponse>> + Send;
}

/// `SessionStore` exposes persisted local session state. The pipeline only
/// ever reads the issuer identifier under [`DID_KEY`].
pub trait SessionStore: Send + Sync {
    /// Retrieve the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Request body for primary credential issuance: `{"id": <issuer did>}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreateCredentialRequest {
    /// The issuer's decentralized identifier.
    pub id: String,
}

/// Request body for primary attestation issuance: `{"address": <recipient>}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreateAttestationRequest {
    /// The recipient address the attestation is about.
    pub address: String,
}

/// Request body for the local relay stage: `{"toJson": <intermediate>}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RelayRequest {
    /// The intermediate object returned by the primary backend, verbatim.
    #[serde(rename = "toJson")]
    pub to_json: Value,
}

/// Selects the local relay endpoint for an intermediate issuance result.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum RelayKind {
    /// An EIP-712-signed credential, relayed to `/api/create`.
    Credential,

    /// A JWT-signed credential, relayed to `/api/create-jwt`.
    CredentialJwt,

    /// An off-chain attestation, relayed to `/api/create-attest`.
    Attestation,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // the issuance services parse these bodies structurally: the shapes are
    // part of the external contract
    #[test]
    fn request_body_shapes() {
        let create = CreateCredentialRequest { id: "did:pkh:eip155:1:0xf39f".into() };
        assert_eq!(
            serde_json::to_value(&create).expect("should serialize"),
            json!({"id": "did:pkh:eip155:1:0xf39f"})
        );

        let attest = CreateAttestationRequest { address: "0xf39f".into() };
        assert_eq!(
            serde_json::to_value(&attest).expect("should serialize"),
            json!({"address": "0xf39f"})
        );

        let relay = RelayRequest { to_json: json!({"ok": true, "id": "att-1"}) };
        assert_eq!(
            serde_json::to_value(&relay).expect("should serialize"),
            json!({"toJson": {"ok": true, "id": "att-1"}})
        );
    }
}
