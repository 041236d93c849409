//! # VC Data Integrity
//!
//! Embedded proofs for typed-data-signed credentials. The proof carries the
//! signature (`proofValue`) together with an `eip712` sub-object recording
//! the exact domain, type graph, and primary type used at signing time —
//! verbatim, never recomputed — so that a verifier can replay the precise
//! digest the signature covers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trustclaim_eip712::{Domain, TypedData, Types};

use crate::model::VerifiableCredential;

/// The proof type for EIP-712 typed-data signatures.
pub const PROOF_TYPE: &str = "EthereumEip712Signature2021";

/// The proof purpose for issuer assertions.
pub const PROOF_PURPOSE: &str = "assertionMethod";

/// An embedded proof securing a credential. To be verifiable, a credential
/// must contain a proof and the details necessary to evaluate it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Proof {
    /// The specific proof type, e.g. "`EthereumEip712Signature2021`". The
    /// type determines the other fields required to secure and verify the
    /// proof.
    #[serde(rename = "type")]
    pub type_: String,

    /// The date-time the proof was created. MUST be an XMLSCHEMA11-2
    /// date-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Used to verify the proof, e.g. a DID URL resolving to the signing
    /// key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// The reason for the proof, acting as a safeguard against misuse.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,

    /// The signature over the typed-data digest. Absent until the signer
    /// returns.
    #[serde(rename = "proofValue")]
    pub proof_value: String,

    /// The typed-data description used at signing time, recorded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip712: Option<Eip712Metadata>,
}

/// The `(domain, types, primaryType)` triple a verifier needs to recompute
/// the signed digest from the credential document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Metadata {
    /// The signing domain.
    pub domain: Domain,

    /// The full type graph, field order preserved.
    pub types: Types,

    /// The struct type of the signed message.
    pub primary_type: String,
}

impl From<&TypedData> for Eip712Metadata {
    fn from(typed_data: &TypedData) -> Self {
        Self {
            domain: typed_data.domain.clone(),
            types: typed_data.types.clone(),
            primary_type: typed_data.primary_type.clone(),
        }
    }
}

impl VerifiableCredential {
    /// Seals the credential with a typed-data signature proof.
    ///
    /// The `eip712` sub-object is copied verbatim from the descriptor the
    /// signature was produced over. Calling this twice overwrites the
    /// previous proof silently — callers must attach exactly once.
    #[must_use]
    pub fn attach_proof(
        mut self, signature: impl Into<String>, typed_data: &TypedData,
        verification_method: impl Into<String>,
    ) -> Self {
        self.proof = Some(Proof {
            type_: PROOF_TYPE.into(),
            created: Some(Utc::now()),
            verification_method: verification_method.into(),
            proof_purpose: PROOF_PURPOSE.into(),
            proof_value: signature.into(),
            eip712: Some(Eip712Metadata::from(typed_data)),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};
    use trustclaim_eip712::project;

    use super::*;
    use crate::model::CredentialSubject;

    fn signed() -> (VerifiableCredential, TypedData) {
        let vc = VerifiableCredential::builder()
            .id("urn:uuid:0f9b1c9e-7a1d-4c2f-a76d-3c2f54c1b0aa")
            .issuer("did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
            .add_subject(CredentialSubject {
                id: Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8".into()),
                claims: json!({"trusted": true})
                    .as_object()
                    .map_or_else(Map::default, Clone::clone),
            })
            .build()
            .expect("should build");

        let typed_data = project(
            Domain::new("VerifiableCredential", "1", 1),
            "VerifiableCredential",
            &vc.to_map().expect("should serialize"),
        )
        .expect("should project");

        (vc.attach_proof("0xsignature", &typed_data, "did:pkh:eip155:1:0xf39f#controller"), typed_data)
    }

    #[test]
    fn proof_replays_signing_structure() {
        let (vc, typed_data) = signed();

        let proof = vc.proof.as_ref().expect("proof should be attached");
        let eip712 = proof.eip712.as_ref().expect("eip712 metadata should be attached");

        // the verifier's replayed structure is exactly the signed structure
        assert_eq!(eip712.domain, typed_data.domain);
        assert_eq!(eip712.types, typed_data.types);
        assert_eq!(eip712.primary_type, typed_data.primary_type);
    }

    #[test]
    fn proof_shape() {
        let (vc, _) = signed();
        let proof_json = serde_json::to_value(vc.proof.expect("proof should be attached"))
            .expect("should serialize");

        assert_eq!(*proof_json.get("type").expect("type should be set"), json!(PROOF_TYPE));
        assert_eq!(
            *proof_json.get("proofPurpose").expect("proofPurpose should be set"),
            json!(PROOF_PURPOSE)
        );
        assert_eq!(
            *proof_json.get("proofValue").expect("proofValue should be set"),
            json!("0xsignature")
        );
        assert!(proof_json.get("eip712").is_some(), "eip712 metadata should serialize");
    }

    #[test]
    fn second_attach_overwrites() {
        let (vc, typed_data) = signed();
        let resealed = vc.attach_proof("0xother", &typed_data, "did:pkh:eip155:1:0xf39f#controller");

        let proof = resealed.proof.expect("proof should be attached");
        assert_eq!(proof.proof_value, "0xother");
    }
}
