//! # Federated Queries
//!
//! The independent read path over published claims: execute a declarative
//! query against a federated graph-query node and return the claim edges.
//! Only read-style queries defined here are ever issued — no mutation
//! capability is exposed through this path — and schema-introspection
//! answers are suppressed so probe queries cannot leak the node's internal
//! schema shape to the display layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::QueryClient;
use crate::Error;

/// The probe query for the most recently published credential edge.
pub const CREDENTIALS_QUERY: &str = "\
query VerifiableCredentials {
  verifiableClaimIndex(last: 1) {
    edges {
      node {
        recipient { id }
        controller { id }
        ... on VerifiableCredential {
          expirationDate
          context
          ... on VCEIP712Proof {
            proof { created }
            ... on AccountTrustCredential712 { trusted }
          }
        }
      }
    }
  }
}";

/// The probe query for the most recently published attestation edge.
pub const ATTESTATIONS_QUERY: &str = "\
query Attestations {
  verifiableClaimIndex(last: 1) {
    edges {
      node {
        recipient { id }
        controller { id }
        ... on AccountAttestation { r s v trusted }
      }
    }
  }
}";

/// A read-only query plus zero or more bound variables.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct QueryRequest {
    /// The query text.
    pub query: String,

    /// Bound variables, when the query declares any.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl QueryRequest {
    /// Returns a new [`QueryRequest`] with no bound variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }
}

/// A query-level error reported by the node.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GraphError {
    /// The node's error message.
    pub message: String,
}

/// The node's response: a `data` field, an error list, or both.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct QueryResponse {
    /// The query result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Query-level errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphError>>,
}

/// Execute a read query and return the response's `data` field.
///
/// Returns `None` when the response is a schema-introspection answer —
/// suppressed by design rather than handed to the display layer.
///
/// # Errors
///
/// `Error::Query` when the node reports query-level errors, returns no
/// data, or cannot be reached. Never a partial or guessed result.
pub async fn fetch(
    provider: &impl QueryClient, request: &QueryRequest,
) -> Result<Option<Value>, Error> {
    tracing::debug!("query::fetch");

    // read path only: mutations never leave this component
    let text = request.query.trim_start();
    if !(text.starts_with("query") || text.starts_with('{')) {
        return Err(Error::Query("only read queries are supported".into()));
    }

    let response =
        provider.execute(request).await.map_err(|e| Error::Query(e.to_string()))?;

    if let Some(errors) = &response.errors {
        if !errors.is_empty() {
            let detail =
                errors.iter().map(|e| e.message.clone()).collect::<Vec<_>>().join("; ");
            return Err(Error::Query(detail));
        }
    }

    let Some(data) = response.data else {
        return Err(Error::Query("response contains no data".into()));
    };

    if data.get("__schema").is_some() {
        return Ok(None);
    }

    Ok(Some(data))
}

/// The claim edges contained in a query result, in the order the node
/// returned them.
#[must_use]
pub fn claim_edges(data: &Value) -> Vec<Value> {
    data.get("verifiableClaimIndex")
        .and_then(|index| index.get("edges"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
