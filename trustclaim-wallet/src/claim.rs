//! # Claim Issuance
//!
//! The claim pipeline endpoint: mint one trust claim about an address and
//! publish it. Data flows one way — build → project → sign → attach →
//! submit — suspending at every external call. Which branch runs is
//! determined entirely by the [`ClaimRequest`] value object; the pipeline
//! holds no session state of its own.

mod attestation;
mod credential;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trustclaim_w3c_vc::model::VerifiableCredential;

use crate::provider::{SessionStore, WalletProvider, DID_KEY};
use crate::Error;

/// The kind of trust claim to mint.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ClaimKind {
    /// A lightweight off-chain attestation.
    #[default]
    #[serde(rename = "attestation")]
    Attestation,

    /// A W3C Verifiable Credential.
    #[serde(rename = "verifiableCredential")]
    VerifiableCredential,
}

/// How a Verifiable Credential is signed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum SignatureMode {
    /// An EIP-712 typed-data signature, attached as an embedded proof.
    #[default]
    #[serde(rename = "EIP712")]
    Eip712,

    /// An enveloping JWT signature.
    #[serde(rename = "JWT")]
    Jwt,
}

/// A claim issuance request. An explicit value object: everything the
/// pipeline branches on travels in the request, nothing in shared state.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaimRequest {
    /// The kind of claim to mint.
    pub kind: ClaimKind,

    /// The signature mode for credential claims.
    pub signature: SignatureMode,

    /// The issuer's decentralized identifier. When absent, the session
    /// store's `"did"` entry is consulted.
    pub issuer: Option<String>,

    /// The connected wallet account: the signer and the claim recipient.
    /// Absent when no wallet session exists.
    pub address: Option<String>,
}

/// The result of a claim issuance: the sealed artifact plus both
/// submission-stage responses.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// A published Verifiable Credential.
    Credential {
        /// The claim document, sealed with its proof for the EIP-712 mode.
        credential: VerifiableCredential,

        /// The compact JWS, for the JWT mode.
        jws: Option<String>,

        /// The primary issuance backend's intermediate response.
        issued: Value,

        /// The local relay's response.
        receipt: Value,
    },

    /// A published off-chain attestation.
    Attestation {
        /// The attestation object returned by the primary backend.
        attestation: Value,

        /// The local relay's response.
        receipt: Value,
    },
}

/// Mint and publish one trust claim.
///
/// The issuer identifier is resolved from the request, falling back to the
/// session store; a missing issuer or missing wallet account is a
/// precondition failure raised before any external call. Once the signer
/// has been dispatched the pipeline runs to completion or failure — there
/// is no cancellation and no internal retry.
///
/// # Errors
///
/// `Error::Precondition` before any external call when the issuer or
/// account is missing; `Error::SignerRejected`, `Error::TypeProjection`,
/// or `Error::RemoteService` as the corresponding pipeline stage fails.
pub async fn create(
    provider: impl WalletProvider, request: &ClaimRequest,
) -> Result<ClaimOutcome, Error> {
    tracing::debug!("claim::create");

    let issuer = match request.issuer.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => provider
            .get(DID_KEY)
            .await
            .map_err(|e| Error::Precondition(e.to_string()))?
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Precondition("no issuer identifier available".into()))?,
    };

    let Some(account) = request.address.as_deref().filter(|a| !a.is_empty()) else {
        return Err(Error::Precondition("no signer account connected".into()));
    };

    match request.kind {
        ClaimKind::VerifiableCredential => {
            credential::create(&provider, request.signature, &issuer, account).await
        }
        ClaimKind::Attestation => attestation::create(&provider, account).await,
    }
}
