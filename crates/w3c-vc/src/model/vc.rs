//! # W3C Verifiable Credentials Data Model
//!
//! An implementation of the W3C [Verifiable Credentials Data Model v1.1]
//! subset needed to express trust claims about an account.
//!
//! [Verifiable Credentials Data Model v1.1]: (https://www.w3.org/TR/vc-data-model)

use std::collections::HashMap;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Kind, Quota};
use crate::proof::integrity::Proof;

/// The mandatory first `@context` entry for every credential.
pub const BASE_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The mandatory `type` entry for every credential.
pub const BASE_TYPE: &str = "VerifiableCredential";

/// `VerifiableCredential` represents the W3C Verifiable Credential data
/// model v1.1. See <https://www.w3.org/TR/vc-data-model>.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiableCredential {
    /// The @context property is used to map property URIs into short-form
    /// aliases. It is an ordered set where the first item is
    /// "`https://www.w3.org/2018/credentials/v1`".
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The credential's URI, e.g. "`urn:uuid:f38b6ab0-…`".
    pub id: String,

    /// Uniquely identifies the type of the credential: the set of claims the
    /// credential contains. An ordered set of URIs (full or relative to
    /// @context) whose first entry is "`VerifiableCredential`".
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// A URI or object with an id property identifying the credential
    /// issuer.
    pub issuer: Kind<Issuer>,

    /// An RFC3339 date-time the credential becomes valid,
    /// e.g. 2010-01-01T19:23:24Z.
    pub issuance_date: DateTime<Utc>,

    /// A set of objects containing claims about credential subject(s).
    pub credential_subject: Quota<CredentialSubject>,

    /// The cryptographic proof that can be used to detect tampering and
    /// verify authorship of the credential. Absent until the signing
    /// pipeline attaches it; the document is sealed afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// An RFC3339 date-time the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Used to determine the status of the credential, such as whether it is
    /// suspended or revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,

    /// Defines the structure and datatypes of the credential, for checking
    /// credential data conformance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<Quota<CredentialSchema>>,
}

impl VerifiableCredential {
    /// Returns a new [`VcBuilder`], which can be used to build a
    /// [`VerifiableCredential`].
    #[must_use]
    pub fn builder() -> VcBuilder {
        VcBuilder::new()
    }

    /// The credential serialized as a JSON object, as it is projected into
    /// typed data and submitted for publication.
    ///
    /// # Errors
    ///
    /// Fails when the credential cannot be serialized.
    pub fn to_map(&self) -> anyhow::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => bail!("credential should serialize to an object"),
        }
    }

    /// The issuer's identifier, whether the issuer is a string or an object.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Kind::String(id) => id,
            Kind::Object(issuer) => &issuer.id,
        }
    }
}

/// Issuer identifies the issuer of the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Issuer {
    /// The issuer URI, typically a decentralized identifier.
    pub id: String,

    /// Issuer-specific fields that may be used to express additional
    /// information about the issuer.
    #[serde(flatten)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<HashMap<String, Value>>,
}

/// `CredentialSubject` holds claims about the subject(s) referenced by the
/// credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// A URI that uniquely identifies the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// `CredentialStatus` can be used for the discovery of information about the
/// current status of a credential, such as whether it is suspended or
/// revoked.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialStatus {
    /// A URI where credential status information can be retrieved.
    pub id: String,

    /// Refers to the status method used to provide the (machine readable)
    /// status of the credential.
    #[serde(rename = "type")]
    pub type_: String,
}

/// `CredentialSchema` defines the structure of the credential and the
/// datatypes of each property contained.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSchema {
    /// A URI identifying the schema file.
    pub id: String,

    /// The schema validation method, e.g. "`JsonSchemaValidator2018`".
    #[serde(rename = "type")]
    pub type_: String,
}

/// [`VcBuilder`] is used to build a [`VerifiableCredential`].
///
/// The `@context` and `type` sets are normalized on `build`: the mandatory
/// baseline entries are present exactly once whether the caller supplied
/// them, supplied a partial set, or supplied nothing at all.
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct VcBuilder {
    vc: VerifiableCredential,
}

impl VcBuilder {
    /// Returns a new [`VcBuilder`].
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("VcBuilder::new");

        let mut builder = Self::default();
        builder.vc.issuance_date = Utc::now();
        builder
    }

    /// Adds an `@context` entry.
    #[must_use]
    pub fn add_context(mut self, context: Kind<Value>) -> Self {
        self.vc.context.push(context);
        self
    }

    /// Sets the `id` property.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vc.id = id.into();
        self
    }

    /// Adds a `type` entry.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        self.vc.type_.push(type_.into());
        self
    }

    /// Sets the `issuer` property.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.vc.issuer = Kind::String(issuer.into());
        self
    }

    /// Sets the `issuanceDate` property. Defaults to the time the builder
    /// was created.
    #[must_use]
    pub fn issuance_date(mut self, issuance_date: DateTime<Utc>) -> Self {
        self.vc.issuance_date = issuance_date;
        self
    }

    /// Sets the `expirationDate` property.
    #[must_use]
    pub fn expiration_date(mut self, expiration_date: DateTime<Utc>) -> Self {
        self.vc.expiration_date = Some(expiration_date);
        self
    }

    /// Adds one or more `credential_subject` properties.
    #[must_use]
    pub fn add_subject(mut self, subj: CredentialSubject) -> Self {
        let one_set = match self.vc.credential_subject {
            Quota::One(one) => {
                if one == CredentialSubject::default() {
                    Quota::One(subj)
                } else {
                    Quota::Many(vec![one, subj])
                }
            }
            Quota::Many(mut set) => {
                set.push(subj);
                Quota::Many(set)
            }
        };

        self.vc.credential_subject = one_set;
        self
    }

    /// Turns this builder into a [`VerifiableCredential`], normalizing the
    /// `@context` and `type` sets.
    ///
    /// # Errors
    ///
    /// Fails when the issuer, id, or credential subject are not set.
    pub fn build(mut self) -> anyhow::Result<VerifiableCredential> {
        tracing::debug!("VcBuilder::build");

        let base = Kind::String(BASE_CONTEXT.into());
        if !self.vc.context.contains(&base) {
            self.vc.context.push(base);
        }
        if !self.vc.type_.iter().any(|t| t == BASE_TYPE) {
            self.vc.type_.push(BASE_TYPE.into());
        }

        if self.vc.id.is_empty() {
            bail!("no id set");
        }

        if let Kind::String(id) = &self.vc.issuer {
            if id.is_empty() {
                bail!("no issuer set");
            }
        }

        if let Quota::One(subj) = &self.vc.credential_subject {
            if *subj == CredentialSubject::default() {
                bail!("no credential subject set");
            }
        }

        Ok(self.vc)
    }
}

impl TryFrom<VcBuilder> for VerifiableCredential {
    type Error = anyhow::Error;

    fn try_from(builder: VcBuilder) -> anyhow::Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Once;

    use serde_json::json;
    use tracing_subscriber::FmtSubscriber;

    use super::*;

    // initalise tracing once for all tests
    static INIT: Once = Once::new();

    fn init_tracer() {
        INIT.call_once(|| {
            let subscriber =
                FmtSubscriber::builder().with_max_level(tracing::Level::ERROR).finish();
            tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
        });
    }

    fn sample_builder() -> VcBuilder {
        VerifiableCredential::builder()
            .id("urn:uuid:f38b6ab0-1f23-4b31-9f4d-59b36c2d0a1e")
            .issuer("did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
            .add_subject(CredentialSubject {
                id: Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8".into()),
                claims: json!({"trusted": true})
                    .as_object()
                    .map_or_else(Map::default, Clone::clone),
            })
    }

    #[test]
    fn builder_normalizes_empty_sets() {
        init_tracer();

        let vc = sample_builder().build().expect("should build");

        assert_eq!(vc.context, vec![Kind::String(BASE_CONTEXT.into())]);
        assert_eq!(vc.type_, vec![BASE_TYPE.to_string()]);
    }

    #[test]
    fn normalization_is_idempotent() {
        init_tracer();

        // caller supplies the mandatory entries already
        let vc = sample_builder()
            .add_context(Kind::String(BASE_CONTEXT.into()))
            .add_type(BASE_TYPE)
            .add_type("AccountTrustCredential712")
            .build()
            .expect("should build");

        assert_eq!(
            vc.context.iter().filter(|c| **c == Kind::String(BASE_CONTEXT.into())).count(),
            1,
            "mandatory context should appear exactly once"
        );
        assert_eq!(
            vc.type_.iter().filter(|t| *t == BASE_TYPE).count(),
            1,
            "mandatory type should appear exactly once"
        );
        assert_eq!(vc.type_, vec![BASE_TYPE.to_string(), "AccountTrustCredential712".to_string()]);
    }

    #[test]
    fn normalization_preserves_caller_order() {
        init_tracer();

        let vc = sample_builder()
            .add_context(Kind::String("https://example.com/contexts/trust/v1".into()))
            .add_type("AccountTrustCredential712")
            .build()
            .expect("should build");

        assert_eq!(
            vc.context,
            vec![
                Kind::String("https://example.com/contexts/trust/v1".into()),
                Kind::String(BASE_CONTEXT.into()),
            ]
        );
        assert_eq!(
            vc.type_,
            vec!["AccountTrustCredential712".to_string(), BASE_TYPE.to_string()]
        );
    }

    #[test]
    fn missing_issuer_fails() {
        init_tracer();

        let result = VerifiableCredential::builder()
            .id("urn:uuid:f38b6ab0-1f23-4b31-9f4d-59b36c2d0a1e")
            .add_subject(CredentialSubject {
                id: Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8".into()),
                claims: Map::default(),
            })
            .build();

        assert!(result.is_err(), "build without an issuer should fail");
    }

    #[test]
    fn serialization_shape() {
        init_tracer();

        let vc = sample_builder()
            .add_type("AccountTrustCredential712")
            .build()
            .expect("should build");
        let vc_json = serde_json::to_value(&vc).expect("should serialize to json");

        assert_eq!(
            *vc_json.get("@context").expect("@context should be set"),
            json!([BASE_CONTEXT])
        );
        assert_eq!(
            *vc_json.get("type").expect("type should be set"),
            json!(["AccountTrustCredential712", BASE_TYPE])
        );
        assert_eq!(
            *vc_json.get("issuer").expect("issuer should be set"),
            json!("did:pkh:eip155:1:0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        assert_eq!(
            *vc_json.get("credentialSubject").expect("credentialSubject should be set"),
            json!({"id": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8", "trusted": true})
        );
        assert!(vc_json.get("proof").is_none(), "unsigned credential should carry no proof");

        // deserialize
        let vc_de: VerifiableCredential =
            serde_json::from_value(vc_json).expect("should deserialize");
        assert_eq!(vc_de, vc);
    }
}
