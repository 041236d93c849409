//! # Verifiable Credentials
//!
//! The W3C [Verifiable Credentials Data Model] subset used for trust claims:
//! the credential document and its builder, the embedded proof model for
//! EIP-712 typed-data signatures, and the JOSE bridge claims for the JWT
//! signature path.
//!
//! [Verifiable Credentials Data Model]: https://www.w3.org/TR/vc-data-model

pub mod model;
pub mod proof;
