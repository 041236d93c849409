//! # Off-chain Attestations
//!
//! The lighter-weight trust claim: a signed statement referencing a fixed
//! schema identifier and ABI-encoded field data, produced and stored
//! without an on-chain transaction. Anyone holding the signed payload can
//! verify it later by recomputing the typed-data digest from the
//! attestation's own fields.
//!
//! The signed struct follows the Ethereum Attestation Service off-chain
//! format: an `Attest` struct under the attestation service's signing
//! domain, signed with a held secp256k1 key into recoverable `{r, s, v}`
//! components.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use trustclaim_eip712::{encode_primitive, Domain, TypeField, TypedData, Types};

use crate::provider::Signer;
use crate::Error;

/// The attestation service contract the signing domain is bound to.
pub const EAS_CONTRACT: &str = "0xC2679fBD37d54388Ce493F1DB75320D236e1815e";

/// The chain the attestation domain is scoped to (Sepolia).
pub const CHAIN_ID: u64 = 11_155_111;

/// The off-chain attestation signing domain name.
pub const DOMAIN_NAME: &str = "EAS Attestation";

/// The off-chain attestation signing domain version.
pub const DOMAIN_VERSION: &str = "0.26";

/// The schema identifier for account trust attestations.
pub const TRUST_SCHEMA: &str =
    "0x27d06e3659317e9a4f8154d1e849eb53d43d91fb4f219884d1684f86d797804a";

/// The field layout of the account trust schema.
pub const TRUST_SCHEMA_FIELDS: &str = "bool Human";

/// The zero reference UID: this attestation does not amend another.
pub const ZERO_UID: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// A recoverable ECDSA signature in its Ethereum component form.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Eip712Signature {
    /// The signature's `r` component, hex-encoded.
    pub r: String,

    /// The signature's `s` component, hex-encoded.
    pub s: String,

    /// The recovery id, offset to 27/28 as Ethereum signers emit it.
    pub v: u64,
}

/// Encodes schema field values into the attestation's `data` bytes.
///
/// Supports the closed set of static ABI shapes (`bool`, `address`,
/// `uintN`, `bytesN`), each encoding to one 32-byte word. Dynamic shapes
/// are rejected at parse time rather than silently mis-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaEncoder {
    fields: Vec<TypeField>,
}

impl SchemaEncoder {
    /// Parse a schema field layout such as `"bool Human"` or
    /// `"address account, bool trusted"`.
    ///
    /// # Errors
    ///
    /// Fails when the layout is malformed or names a dynamic field type.
    pub fn new(schema: &str) -> Result<Self, Error> {
        let mut fields = Vec::new();

        for entry in schema.split(',') {
            let mut parts = entry.split_whitespace();
            let (Some(type_), Some(name), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(Error::TypeProjection(format!(
                    "malformed schema entry: '{entry}'"
                )));
            };
            if !is_static(type_) {
                return Err(Error::TypeProjection(format!(
                    "unsupported schema field type: '{type_}'"
                )));
            }
            fields.push(TypeField::new(name, type_));
        }

        Ok(Self { fields })
    }

    /// Encode one value per schema field, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails when the value count does not match the field count or a value
    /// does not parse as its field's type.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>, Error> {
        if values.len() != self.fields.len() {
            return Err(Error::TypeProjection(format!(
                "schema has {} fields but {} values were supplied",
                self.fields.len(),
                values.len()
            )));
        }

        let mut encoded = Vec::with_capacity(32 * values.len());
        for (field, value) in self.fields.iter().zip(values) {
            encoded.extend_from_slice(&encode_primitive(&field.type_, value)?);
        }
        Ok(encoded)
    }
}

// Static ABI shapes encode to exactly one word.
fn is_static(type_: &str) -> bool {
    type_ == "bool"
        || type_ == "address"
        || (type_.starts_with("uint") && !type_.ends_with("[]"))
        || (type_.starts_with("bytes") && type_.len() > 5)
}

/// An attestation request: the statement to sign. Construction applies the
/// canonical form — the recipient is always lower-cased so that address
/// comparison and hashing agree for every verifier.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRequest {
    /// The off-chain attestation format version.
    pub version: u16,

    /// The schema identifier the `data` field is encoded against.
    pub schema: String,

    /// The lower-cased address the attestation is about.
    pub recipient: String,

    /// Unix timestamp of when the attestation was made.
    pub time: u64,

    /// Unix timestamp of when the attestation expires. 0 for no expiration.
    pub expiration_time: u64,

    /// Whether the attestation can later be revoked.
    pub revocable: bool,

    /// UID of an attestation this one references, or [`ZERO_UID`].
    #[serde(rename = "refUID")]
    pub ref_uid: String,

    /// The schema-encoded field bytes.
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Request salt. Not part of the signed struct.
    pub nonce: u64,
}

impl AttestationRequest {
    /// Returns a new [`AttestationRequest`] for `recipient` with the fixed
    /// defaults: made now, never expires, revocable, zero nonce and
    /// reference UID.
    pub fn new(recipient: impl Into<String>, schema: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            version: 1,
            schema: schema.into(),
            recipient: recipient.into().to_lowercase(),
            time: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
            expiration_time: 0,
            revocable: true,
            ref_uid: ZERO_UID.into(),
            data,
            nonce: 0,
        }
    }

    /// Sets the attestation timestamp.
    #[must_use]
    pub const fn time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Sets the expiration timestamp (0 = never).
    #[must_use]
    pub const fn expiration_time(mut self, expiration_time: u64) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    /// Sets the revocable flag.
    #[must_use]
    pub const fn revocable(mut self, revocable: bool) -> Self {
        self.revocable = revocable;
        self
    }

    /// Sets the request nonce.
    #[must_use]
    pub const fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// The typed-data payload this request signs: the `Attest` struct under
    /// the attestation service's domain. Field order is fixed by the
    /// off-chain attestation format and must never change.
    #[must_use]
    pub fn typed_data(&self) -> TypedData {
        let mut types = Types::new();
        let domain = Domain::new(DOMAIN_NAME, DOMAIN_VERSION, CHAIN_ID)
            .verifying_contract(EAS_CONTRACT);

        types.insert(
            "Attest".into(),
            vec![
                TypeField::new("version", "uint16"),
                TypeField::new("schema", "bytes32"),
                TypeField::new("recipient", "address"),
                TypeField::new("time", "uint64"),
                TypeField::new("expirationTime", "uint64"),
                TypeField::new("revocable", "bool"),
                TypeField::new("refUID", "bytes32"),
                TypeField::new("data", "bytes"),
            ],
        );
        types.insert("EIP712Domain".into(), domain.type_fields());

        let mut message = Map::new();
        message.insert("version".into(), Value::Number(Number::from(self.version)));
        message.insert("schema".into(), Value::String(self.schema.clone()));
        message.insert("recipient".into(), Value::String(self.recipient.clone()));
        message.insert("time".into(), Value::Number(Number::from(self.time)));
        message.insert(
            "expirationTime".into(),
            Value::Number(Number::from(self.expiration_time)),
        );
        message.insert("revocable".into(), Value::Bool(self.revocable));
        message.insert("refUID".into(), Value::String(self.ref_uid.clone()));
        message.insert("data".into(), Value::String(format!("0x{}", hex::encode(&self.data))));

        TypedData {
            types,
            primary_type: "Attest".into(),
            domain,
            message,
        }
    }

    /// The 32-byte signing digest for this request.
    ///
    /// # Errors
    ///
    /// Fails when a field does not parse as its declared type.
    pub fn digest(&self) -> Result<[u8; 32], Error> {
        Ok(self.typed_data().digest()?)
    }

    /// Sign this request with the held attestation key, producing the
    /// off-chain attestation. Ownership of the result transfers to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Fails with `Error::SignerRejected` when the signer declines, or
    /// `Error::TypeProjection` when the request cannot be hashed.
    pub async fn sign(self, signer: &impl Signer) -> Result<OffchainAttestation, Error> {
        tracing::debug!("AttestationRequest::sign");

        let digest = self.digest()?;
        let signature = signer
            .sign_digest(&digest)
            .await
            .map_err(|e| Error::SignerRejected(e.to_string()))?;

        Ok(OffchainAttestation {
            uid: format!("0x{}", hex::encode(digest)),
            version: self.version,
            schema: self.schema,
            recipient: self.recipient,
            time: self.time,
            expiration_time: self.expiration_time,
            revocable: self.revocable,
            ref_uid: self.ref_uid,
            data: format!("0x{}", hex::encode(&self.data)),
            signature,
        })
    }
}

/// A signed off-chain attestation. Opaque beyond its signature and
/// referenced schema: verification replays the typed-data digest from these
/// fields alone.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OffchainAttestation {
    /// The attestation's unique identifier: its signing digest.
    pub uid: String,

    /// The off-chain attestation format version.
    pub version: u16,

    /// The schema identifier the data is encoded against.
    pub schema: String,

    /// The lower-cased recipient address.
    pub recipient: String,

    /// Unix timestamp of when the attestation was made.
    pub time: u64,

    /// Unix timestamp of when the attestation expires. 0 for no expiration.
    pub expiration_time: u64,

    /// Whether the attestation can later be revoked.
    pub revocable: bool,

    /// UID of a referenced attestation, or [`ZERO_UID`].
    #[serde(rename = "refUID")]
    pub ref_uid: String,

    /// The schema-encoded field bytes, hex-encoded.
    pub data: String,

    /// The recoverable signature over the typed-data digest.
    pub signature: Eip712Signature,
}
