//! The off-chain attestation branch of the claim pipeline.
//!
//! The attestation itself is constructed and signed by the primary
//! backend's key custodian (see [`crate::attestation`] for the signing
//! core); this branch performs the two-stage submission and relays the
//! signed object.

use crate::claim::ClaimOutcome;
use crate::provider::{CreateAttestationRequest, RelayKind, RelayRequest, WalletProvider};
use crate::Error;

pub(crate) async fn create(
    provider: &impl WalletProvider, account: &str,
) -> Result<ClaimOutcome, Error> {
    tracing::debug!("attestation::create");

    let attestation = provider
        .create_attestation(&CreateAttestationRequest { address: account.into() })
        .await
        .map_err(|e| Error::RemoteService(e.to_string()))?;

    let receipt = provider
        .relay(RelayKind::Attestation, &RelayRequest { to_json: attestation.clone() })
        .await
        .map_err(|e| {
            Error::RemoteService(format!("relay failed after attestation succeeded: {e}"))
        })?;
    tracing::debug!("attestation receipt: {receipt}");

    Ok(ClaimOutcome::Attestation { attestation, receipt })
}
