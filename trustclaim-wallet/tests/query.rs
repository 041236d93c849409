//! Tests for the federated query path: introspection suppression and
//! structured error reporting.


use trustclaim_wallet::query::{self, QueryRequest, ATTESTATIONS_QUERY, CREDENTIALS_QUERY};
use trustclaim_wallet::Error;

use crate::provider::Provider;

#[tokio::test]
async fn introspection_answers_are_suppressed() {
    let provider = Provider::new(None);
    let request = QueryRequest::new("query { __schema { types { name } } }");

    let data = query::fetch(&provider, &request).await.expect("fetch should succeed");
    assert!(data.is_none(), "schema introspection should not reach the caller");
}

#[tokio::test]
async fn ordinary_data_is_returned_unchanged() {
    let provider = Provider::new(None);

    let data = query::fetch(&provider, &QueryRequest::new(CREDENTIALS_QUERY))
        .await
        .expect("fetch should succeed")
        .expect("data should be present");

    let edges = query::claim_edges(&data);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["trusted"], serde_json::json!(true));
}

#[tokio::test]
async fn node_errors_are_structured() {
    let provider = Provider::new(None).with_query_failure();

    let err = query::fetch(&provider, &QueryRequest::new(ATTESTATIONS_QUERY))
        .await
        .expect_err("node errors should surface");

    let Error::Query(reason) = err else {
        panic!("expected a query error");
    };
    assert!(reason.contains("Cannot query field"));
}

// The two probe queries are read-only selections over the published claim
// index.
#[tokio::test]
async fn probe_queries_are_read_only() {
    for probe in [CREDENTIALS_QUERY, ATTESTATIONS_QUERY] {
        assert!(probe.trim_start().starts_with("query"));
        assert!(!probe.contains("mutation"));
    }

    let provider = Provider::new(None);
    query::fetch(&provider, &QueryRequest::new(ATTESTATIONS_QUERY))
        .await
        .expect("fetch should succeed");

    assert_eq!(provider.calls().queries.len(), 1);
}

// No mutation capability is exposed through the read path: a mutation is
// refused before it reaches the node.
#[tokio::test]
async fn mutations_never_reach_the_node() {
    let provider = Provider::new(None);
    let request = QueryRequest::new("mutation { createClaim(input: {}) { id } }");

    let err = query::fetch(&provider, &request).await.expect_err("mutations should be refused");
    assert!(matches!(err, Error::Query(_)));
    assert_eq!(provider.calls().queries.len(), 0, "nothing was sent to the node");
}
