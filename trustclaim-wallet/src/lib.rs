//! # Trustclaim Wallet
//!
//! The wallet side of trust claim issuance: mint a claim about an address —
//! a W3C Verifiable Credential signed as EIP-712 typed data (or as a JWT),
//! or a lightweight off-chain attestation — and publish it through two
//! heterogeneous back ends (an issuance service and a federated graph-query
//! node) so it becomes queryable by other participants.
//!
//! The crate does not provide a user interface — that is the job of a
//! wallet implementation.
//!
//! # Design
//!
//! **Endpoints**
//!
//! The library is architected around endpoint functions, each taking a
//! provider and a request value object: [`claim::create`] runs the
//! build → project → sign → attach → submit pipeline for one claim, and
//! [`query::fetch`] is the independent read path over published claims.
//! Each invocation is a linear chain of suspending steps; re-invoking while
//! a prior pipeline is pending is a caller error, and no internal timeout
//! is enforced.
//!
//! **Provider**
//!
//! Implementors inject the external collaborators through the
//! [`provider`] traits: the signer capability (browser wallet or remote
//! key custodian), the issuance HTTP client, the federated query client,
//! and the session store holding the active issuer identifier. HTTP-backed
//! implementations ship in [`provider::http`].

pub mod attestation;
pub mod claim;
mod error;
pub mod keystore;
pub mod provider;
pub mod query;

pub use claim::{ClaimKind, ClaimOutcome, ClaimRequest, SignatureMode};
pub use error::Error;
