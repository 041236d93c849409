//! # Securing Credentials
//!
//! A credential is secured by exactly one mechanism in this model: an
//! embedded proof carrying an EIP-712 typed-data signature alongside the
//! typed-data description a verifier needs to replay the exact signing
//! digest, or an enveloping JOSE proof (a compact JWS) for the JWT path.
//!
//! The general structure for embedded proofs is defined in the [Verifiable
//! Credential Data Integrity 1.0] specification; the typed-data signature
//! suite follows [EthereumEip712Signature2021].
//!
//! [Verifiable Credential Data Integrity 1.0]: https://www.w3.org/TR/vc-data-integrity
//! [EthereumEip712Signature2021]: https://w3c-ccg.github.io/ethereum-eip712-signature-2021-spec

pub mod integrity;
pub mod jose;
