//! # EIP-712 Typed Data
//!
//! An implementation of [EIP-712] typed structured data: the type graph and
//! domain model, a projector that derives a type graph from an arbitrary JSON
//! document, and the encoding/hashing primitives (`encodeType`, `hashStruct`,
//! domain separator, and final signing digest).
//!
//! Typed-data digests are order-sensitive: the same fields hashed in a
//! different order produce a different digest. Everything in this crate
//! preserves field order end-to-end so that a verifier replaying the
//! published structure recomputes the exact digest that was signed.
//!
//! [EIP-712]: https://eips.ethereum.org/EIPS/eip-712

mod hash;
mod projector;

use std::collections::BTreeMap;

pub use hash::{
    digest, domain_separator, encode_primitive, encode_type, hash_struct, keccak256, type_hash,
};
pub use projector::{is_address, project};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Errors raised while deriving or encoding a type graph. All variants are
/// definition errors: the document cannot be signed deterministically and the
/// invocation is fatal.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// An array's elements do not share a single shape.
    #[error("array elements for '{0}' have inconsistent shapes")]
    Heterogeneous(String),

    /// Two fields synthesized the same sub-type name with different field
    /// lists.
    #[error("conflicting definitions for type '{0}'")]
    TypeConflict(String),

    /// A value falls outside the closed set of supported shapes.
    #[error("unsupported value shape for '{0}': {1}")]
    Unsupported(String, String),

    /// A struct type is referenced but has no entry in the type mapping.
    #[error("no type definition for '{0}'")]
    UnknownType(String),

    /// A value does not parse as its declared wire type.
    #[error("invalid '{0}' value: {1}")]
    InvalidValue(String, String),
}

/// The EIP-712 domain separator fields. Scopes a signature to a protocol
/// instance so that a signed payload cannot be replayed against another
/// contract or chain.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Human-readable name of the signing domain.
    pub name: String,

    /// Current major version of the signing domain.
    pub version: String,

    /// EIP-155 chain id the signature is bound to.
    pub chain_id: u64,

    /// Address of the contract that will verify the signature, when one
    /// exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
}

impl Domain {
    /// Returns a new [`Domain`].
    pub fn new(name: impl Into<String>, version: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract: None,
        }
    }

    /// Sets the `verifyingContract` field.
    #[must_use]
    pub fn verifying_contract(mut self, contract: impl Into<String>) -> Self {
        self.verifying_contract = Some(contract.into());
        self
    }

    /// The `EIP712Domain` field list for this domain. Only fields that are
    /// present participate in the domain separator.
    #[must_use]
    pub fn type_fields(&self) -> Vec<TypeField> {
        let mut fields = vec![
            TypeField::new("name", "string"),
            TypeField::new("version", "string"),
            TypeField::new("chainId", "uint256"),
        ];
        if self.verifying_contract.is_some() {
            fields.push(TypeField::new("verifyingContract", "address"));
        }
        fields
    }

    /// The domain rendered as a message object, in `type_fields` order.
    #[must_use]
    pub fn message(&self) -> Map<String, Value> {
        let mut msg = Map::new();
        msg.insert("name".into(), Value::String(self.name.clone()));
        msg.insert("version".into(), Value::String(self.version.clone()));
        msg.insert("chainId".into(), Value::Number(Number::from(self.chain_id)));
        if let Some(contract) = &self.verifying_contract {
            msg.insert("verifyingContract".into(), Value::String(contract.clone()));
        }
        msg
    }
}

/// A single named, typed field of a struct type. Field order within a struct
/// is significant.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeField {
    /// The field name.
    pub name: String,

    /// The field's wire type: a primitive tag (`address`, `bool`, `uint256`,
    /// `string`, `bytes`, `bytes32`), an array thereof, or the name of
    /// another struct type in the same mapping.
    #[serde(rename = "type")]
    pub type_: String,
}

impl TypeField {
    /// Returns a new [`TypeField`].
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_: type_.into(),
        }
    }
}

/// Struct type name → ordered field list. `BTreeMap` keeps the mapping's own
/// iteration order deterministic; `encodeType` sorts referenced types by name
/// as EIP-712 requires, so map order never leaks into the digest.
pub type Types = BTreeMap<String, Vec<TypeField>>;

/// A complete typed-data signing payload: the `(domain, types, primaryType,
/// message)` quadruple handed to a structured-data signer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// All struct types referenced transitively from `primary_type`, plus
    /// `EIP712Domain`.
    pub types: Types,

    /// The struct type of `message`.
    pub primary_type: String,

    /// The signing domain.
    pub domain: Domain,

    /// The document being signed.
    pub message: Map<String, Value>,
}

impl TypedData {
    /// The 32-byte signing digest:
    /// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    ///
    /// # Errors
    ///
    /// Fails when the message does not conform to the type graph or a value
    /// does not parse as its declared type.
    pub fn digest(&self) -> Result<[u8; 32], Error> {
        hash::digest(self)
    }
}
