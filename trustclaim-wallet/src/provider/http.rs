//! HTTP-backed providers.
//!
//! Concrete [`IssuerClient`] and [`QueryClient`] implementations over
//! `reqwest`. Transport only: endpoint paths and body shapes live here,
//! while submission policy (ordering, error escalation) stays in the claim
//! pipeline.

use std::time::Duration;

use anyhow::bail;
use http::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::claim::SignatureMode;
use crate::provider::{
    CreateAttestationRequest, CreateCredentialRequest, IssuerClient, QueryClient, RelayKind,
    RelayRequest, Result,
};
use crate::query::{QueryRequest, QueryResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An [`IssuerClient`] over the two issuance back ends: the primary
/// issuance/signing service and the local application relay.
#[derive(Clone, Debug)]
pub struct IssuanceService {
    client: reqwest::Client,
    primary: String,
    relay: String,
}

impl IssuanceService {
    /// Create a new [`IssuanceService`] from the primary service and local
    /// relay base URLs.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be built.
    pub fn new(primary: impl Into<String>, relay: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            primary: primary.into(),
            relay: relay.into(),
        })
    }

    /// The primary issuance path for the given signature mode.
    pub(crate) const fn credential_path(mode: SignatureMode) -> &'static str {
        match mode {
            SignatureMode::Eip712 => "/create",
            SignatureMode::Jwt => "/create-jws",
        }
    }

    /// The local relay path for the given intermediate kind.
    pub(crate) const fn relay_path(kind: RelayKind) -> &'static str {
        match kind {
            RelayKind::Credential => "/api/create",
            RelayKind::CredentialJwt => "/api/create-jwt",
            RelayKind::Attestation => "/api/create-attest",
        }
    }

    async fn post<T: Serialize + Sync>(&self, url: String, body: &T) -> Result<Value> {
        let result = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        if !result.status().is_success() {
            let status = result.status();
            let body = result.text().await.unwrap_or_default();
            bail!("{url} returned {status}: {body}");
        }

        Ok(result.json::<Value>().await?)
    }
}

impl IssuerClient for IssuanceService {
    async fn create_credential(
        &self, mode: SignatureMode, req: &CreateCredentialRequest,
    ) -> Result<Value> {
        let url = format!("{}{}", self.primary, Self::credential_path(mode));
        self.post(url, req).await
    }

    async fn create_attestation(&self, req: &CreateAttestationRequest) -> Result<Value> {
        let url = format!("{}/create-attestation", self.primary);
        self.post(url, req).await
    }

    async fn relay(&self, kind: RelayKind, req: &RelayRequest) -> Result<Value> {
        let url = format!("{}{}", self.relay, Self::relay_path(kind));
        self.post(url, req).await
    }
}

/// A [`QueryClient`] over a federated graph-query node: a node address plus
/// the compiled schema/definition artifact the node was deployed with. The
/// definition is an external, versioned artifact consumed as-is.
#[derive(Clone, Debug)]
pub struct FederatedNode {
    client: reqwest::Client,
    endpoint: String,
    definition: Value,
}

impl FederatedNode {
    /// Create a new [`FederatedNode`] client for the node at `endpoint`,
    /// scoped to the given runtime definition.
    ///
    /// # Errors
    ///
    /// Fails when the definition is not an object or the underlying HTTP
    /// client cannot be built.
    pub fn new(endpoint: impl Into<String>, definition: Value) -> Result<Self> {
        if !definition.is_object() {
            bail!("runtime definition should be an object");
        }
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            definition,
        })
    }

    /// The runtime definition this client was created with.
    #[must_use]
    pub const fn definition(&self) -> &Value {
        &self.definition
    }
}

impl QueryClient for FederatedNode {
    async fn execute(&self, req: &QueryRequest) -> Result<QueryResponse> {
        let result = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(req)
            .send()
            .await?;

        if !result.status().is_success() {
            let status = result.status();
            let body = result.text().await.unwrap_or_default();
            bail!("{} returned {status}: {body}", self.endpoint);
        }

        Ok(result.json::<QueryResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_path_follows_signature_mode() {
        assert_eq!(IssuanceService::credential_path(SignatureMode::Eip712), "/create");
        assert_eq!(IssuanceService::credential_path(SignatureMode::Jwt), "/create-jws");
    }

    #[test]
    fn relay_path_follows_kind() {
        assert_eq!(IssuanceService::relay_path(RelayKind::Credential), "/api/create");
        assert_eq!(IssuanceService::relay_path(RelayKind::CredentialJwt), "/api/create-jwt");
        assert_eq!(IssuanceService::relay_path(RelayKind::Attestation), "/api/create-attest");
    }
}
