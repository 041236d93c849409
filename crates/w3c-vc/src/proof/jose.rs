//! # JOSE Proofs
//!
//! JSON Object Signing and Encryption ([JOSE]) proofs are a form of
//! enveloping proof based on JWT [RFC7519] and JWS [RFC7515]. In this case
//! the credential is the payload, preceded by a header carrying the signing
//! algorithm; the two are base64url-encoded, concatenated, and signed, to be
//! transferred in compact form.
//!
//! [JOSE]: https://datatracker.ietf.org/wg/jose/about
//! [RFC7519]: https://www.rfc-editor.org/rfc/rfc7519
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515

use serde::{Deserialize, Serialize};

use crate::model::{Kind, VerifiableCredential};

/// The JWS header for credential signing: secp256k1 ECDSA over a JWT
/// payload.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JwsHeader {
    /// The signing algorithm.
    pub alg: String,

    /// The token type.
    pub typ: String,
}

impl Default for JwsHeader {
    fn default() -> Self {
        Self {
            alg: "ES256K".into(),
            typ: "JWT".into(),
        }
    }
}

/// Claims used for Verifiable Credential issuance when the credential is
/// signed as a JWT.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct VcClaims {
    /// The `credentialSubject.id` property of the credential: the subject
    /// the claims are about.
    pub sub: String,

    /// The credential's `issuanceDate`, encoded as a UNIX timestamp
    /// ([RFC7519](https://www.rfc-editor.org/rfc/rfc7519) `NumericDate`).
    pub nbf: i64,

    /// The `issuer` property of the credential.
    pub iss: String,

    /// The credential's `issuanceDate`, encoded as a UNIX timestamp.
    pub iat: i64,

    /// The `id` property of the credential.
    pub jti: String,

    /// The credential's `expirationDate`, encoded as a UNIX timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// The Verifiable Credential.
    pub vc: VerifiableCredential,
}

impl From<VerifiableCredential> for VcClaims {
    fn from(vc: VerifiableCredential) -> Self {
        let subject = vc.credential_subject.first();

        let issuer_id = match &vc.issuer {
            Kind::String(id) => id,
            Kind::Object(issuer) => &issuer.id,
        };

        Self {
            sub: subject.and_then(|s| s.id.clone()).unwrap_or_default(),
            nbf: vc.issuance_date.timestamp(),
            iss: issuer_id.clone(),
            iat: vc.issuance_date.timestamp(),
            jti: vc.id.clone(),
            exp: vc.expiration_date.map(|exp| exp.timestamp()),
            vc,
        }
    }
}
