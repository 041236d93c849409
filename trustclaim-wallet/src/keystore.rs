//! # Keystore
//!
//! A held-key signer for off-chain attestations. The key custodian role the
//! remote attestation service plays: it holds a secp256k1 secret and signs
//! typed-data digests into recoverable `{r, s, v}` components.
//!
//! Only digest signing is supported — credential signing belongs to the
//! user's own wallet, and routing it through a held key would let the
//! custodian impersonate the issuer.

use anyhow::bail;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use trustclaim_eip712::{keccak256, TypedData};

use crate::attestation::{Eip712Signature, CHAIN_ID};
use crate::provider::{Result, Signer};

/// The held attestation signing key.
#[derive(Default, Clone, Debug)]
pub struct Keystore;

// Development key only. Deployments supply the secret through their key
// management service.
const ATTESTER_SECRET: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

impl Keystore {
    /// Sign a 32-byte typed-data digest with the held key.
    ///
    /// # Errors
    ///
    /// Fails when the held secret does not parse as a signing key.
    pub fn try_sign_digest(digest: &[u8; 32]) -> Result<Eip712Signature> {
        let decoded = hex::decode(ATTESTER_SECRET)?;
        let signing_key = SigningKey::from_slice(&decoded)?;
        let (signature, recovery_id) = signing_key.sign_prehash_recoverable(digest)?;

        let bytes = signature.to_bytes();
        let (r, s) = bytes.split_at(32);

        Ok(Eip712Signature {
            r: format!("0x{}", hex::encode(r)),
            s: format!("0x{}", hex::encode(s)),
            v: 27 + u64::from(recovery_id.to_byte()),
        })
    }

    /// The Ethereum address of the held key.
    ///
    /// # Errors
    ///
    /// Fails when the held secret does not parse as a signing key.
    pub fn address() -> Result<String> {
        let decoded = hex::decode(ATTESTER_SECRET)?;
        let signing_key = SigningKey::from_slice(&decoded)?;
        let point = signing_key.verifying_key().to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        Ok(format!("0x{}", hex::encode(&hash[12..])))
    }

    /// The verification method verifiers should resolve to check
    /// attestation signatures: the attester's account DID.
    ///
    /// # Errors
    ///
    /// Fails when the held secret does not parse as a signing key.
    pub fn verification_method() -> Result<String> {
        Ok(format!("did:pkh:eip155:{CHAIN_ID}:{}", Self::address()?))
    }
}

impl Signer for Keystore {
    async fn sign_typed_data(&self, _account: &str, _typed_data: &TypedData) -> Result<String> {
        bail!("typed-data signing is not supported by the held-key signer")
    }

    async fn sign_message(&self, _account: &str, _msg: &[u8]) -> Result<Vec<u8>> {
        bail!("message signing is not supported by the held-key signer")
    }

    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Eip712Signature> {
        Self::try_sign_digest(digest)
    }
}
