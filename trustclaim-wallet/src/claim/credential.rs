//! The Verifiable Credential branch of the claim pipeline.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::json;
use trustclaim_eip712::{project, Domain};
use trustclaim_w3c_vc::model::{CredentialSubject, VerifiableCredential, BASE_TYPE};
use trustclaim_w3c_vc::proof::jose::{JwsHeader, VcClaims};
use uuid::Uuid;

use crate::claim::{ClaimOutcome, SignatureMode};
use crate::provider::{
    CreateCredentialRequest, RelayKind, RelayRequest, Signer, WalletProvider,
};
use crate::Error;

/// The credential type carrying the account trust claim.
pub const TRUST_CREDENTIAL_TYPE: &str = "AccountTrustCredential712";

// The typed-data signing domain for credential documents. Verifiers replay
// these values from the attached proof, so they are fixed per domain
// version, never per claim.
const DOMAIN_NAME: &str = "VerifiableCredential";
const DOMAIN_VERSION: &str = "1";
const DOMAIN_CHAIN_ID: u64 = 1;

pub(crate) async fn create(
    provider: &impl WalletProvider, mode: SignatureMode, issuer: &str, account: &str,
) -> Result<ClaimOutcome, Error> {
    tracing::debug!("credential::create");

    let vc = build(issuer, account)?;

    let (sealed, jws) = match mode {
        SignatureMode::Eip712 => (sign_typed_data(provider, account, vc).await?, None),
        SignatureMode::Jwt => {
            let jws = sign_jws(provider, account, &vc).await?;
            (vc, Some(jws))
        }
    };

    let issued = provider
        .create_credential(mode, &CreateCredentialRequest { id: issuer.into() })
        .await
        .map_err(|e| Error::RemoteService(e.to_string()))?;

    let kind = match mode {
        SignatureMode::Eip712 => RelayKind::Credential,
        SignatureMode::Jwt => RelayKind::CredentialJwt,
    };
    let receipt = provider
        .relay(kind, &RelayRequest { to_json: issued.clone() })
        .await
        .map_err(|e| {
            Error::RemoteService(format!("relay failed after issuance succeeded: {e}"))
        })?;
    tracing::debug!("credential receipt: {receipt}");

    Ok(ClaimOutcome::Credential {
        credential: sealed,
        jws,
        issued,
        receipt,
    })
}

// Assemble the unsigned claim document: the trust assertion about the
// connected account, issued by the session's DID.
fn build(issuer: &str, recipient: &str) -> Result<VerifiableCredential, Error> {
    VerifiableCredential::builder()
        .id(format!("urn:uuid:{}", Uuid::new_v4()))
        .add_type(TRUST_CREDENTIAL_TYPE)
        .issuer(issuer)
        .add_subject(CredentialSubject {
            id: Some(recipient.into()),
            claims: json!({"trusted": true})
                .as_object()
                .map_or_else(serde_json::Map::default, Clone::clone),
        })
        .build()
        .map_err(|e| Error::Precondition(e.to_string()))
}

// Project, sign, and seal: the typed-data structure handed to the signer is
// recorded verbatim in the proof so verifiers replay the exact digest.
async fn sign_typed_data(
    provider: &impl WalletProvider, account: &str, vc: VerifiableCredential,
) -> Result<VerifiableCredential, Error> {
    let document = vc.to_map().map_err(|e| Error::TypeProjection(e.to_string()))?;
    let typed_data = project(
        Domain::new(DOMAIN_NAME, DOMAIN_VERSION, DOMAIN_CHAIN_ID),
        BASE_TYPE,
        &document,
    )?;

    let signature = provider
        .sign_typed_data(account, &typed_data)
        .await
        .map_err(|e| Error::SignerRejected(e.to_string()))?;

    let verification_method = format!("{}#controller", vc.issuer_id());
    Ok(vc.attach_proof(signature, &typed_data, verification_method))
}

// Sign the credential as a compact JWS: header and claims base64url-encoded
// into the signing input, with the raw signature appended.
async fn sign_jws(
    provider: &impl Signer, account: &str, vc: &VerifiableCredential,
) -> Result<String, Error> {
    let header = serde_json::to_vec(&JwsHeader::default())
        .map_err(|e| Error::TypeProjection(e.to_string()))?;
    let claims = serde_json::to_vec(&VcClaims::from(vc.clone()))
        .map_err(|e| Error::TypeProjection(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        Base64UrlUnpadded::encode_string(&header),
        Base64UrlUnpadded::encode_string(&claims)
    );

    let signature = provider
        .sign_message(account, signing_input.as_bytes())
        .await
        .map_err(|e| Error::SignerRejected(e.to_string()))?;

    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&signature)))
}
