//! End-to-end aggregation tests using wiremock
//!
//! These tests run the real HTTP fetcher against mock servers and
//! validate the per-source isolation, dedup and notification behavior
//! of a full aggregation run.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use subsync::aggregator::Aggregator;
use subsync::catalog::{Source, SourceCatalog};
use subsync::config::{Config, FetchConfig};
use subsync::fetcher::HttpFetcher;
use subsync::models::Subscription;
use subsync::notify::{AggregationEvent, Notifier, SourceOutcome};
use subsync::store::ServerStore;

fn harness() -> (Aggregator, Arc<ServerStore>) {
    let store = Arc::new(ServerStore::in_memory().unwrap());
    let fetcher = Arc::new(HttpFetcher::new(&Config::default().fetch).unwrap());
    let aggregator = Aggregator::new(fetcher, Arc::clone(&store), Notifier::new());
    (aggregator, store)
}

fn source(id: &str, url: String) -> Source {
    Source {
        id: id.to_string(),
        label: id.to_string(),
        url,
        built_in: false,
    }
}

fn three_links() -> String {
    "vless://u1@h1.example.com:443#n1\n\
     vless://u2@h2.example.com:443#n2\n\
     vless://u3@h3.example.com:443#n3"
        .to_string()
}

/// Two sources: A returns an empty body, B returns three valid lines.
/// The store must end with exactly B's 3 entries and exactly one
/// failure notification naming A.
#[tokio::test]
async fn test_empty_body_and_valid_sibling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .mount(&mock_server)
        .await;

    let (aggregator, store) = harness();
    let mut events = aggregator.notifier().subscribe();

    let summary = aggregator
        .run(vec![
            source("a", format!("{}/a", mock_server.uri())),
            source("b", format!("{}/b", mock_server.uri())),
        ])
        .await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.inserted, 3);

    let stored = store.servers().unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|s| s.config.subscription_id == "b"));

    let mut failures = Vec::new();
    loop {
        match events.try_recv() {
            Ok(AggregationEvent::Source(e)) => {
                if !e.outcome.is_success() {
                    failures.push(e.source_id);
                }
            }
            Ok(AggregationEvent::Completed { .. }) | Err(_) => break,
        }
    }
    assert_eq!(failures, vec!["a".to_string()]);
}

/// Fetches carry the fixed custom user-agent
#[tokio::test]
async fn test_custom_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sub"))
        .and(header("user-agent", "subsync/test-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetch_config = FetchConfig {
        request_timeout_secs: 10,
        user_agent: "subsync/test-agent".to_string(),
    };
    let store = Arc::new(ServerStore::in_memory().unwrap());
    let fetcher = Arc::new(HttpFetcher::new(&fetch_config).unwrap());
    let aggregator = Aggregator::new(fetcher, store, Notifier::new());

    let summary = aggregator
        .run_one(source("s", format!("{}/sub", mock_server.uri())))
        .await;
    assert_eq!(summary.succeeded, 1);
}

/// A transport-encoded payload that fails the plain parse succeeds
/// after the base64 fallback tier
#[tokio::test]
async fn test_transport_encoded_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b64"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STANDARD.encode(three_links())))
        .mount(&mock_server)
        .await;

    let (aggregator, store) = harness();
    let summary = aggregator
        .run_one(source("s", format!("{}/b64", mock_server.uri())))
        .await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.inserted, 3);
    assert_eq!(store.count_servers().unwrap(), 3);
}

/// Refreshing the same subscription twice with identical payload leaves
/// the same final entry count as importing once
#[tokio::test]
async fn test_refresh_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sub"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .mount(&mock_server)
        .await;

    let (aggregator, store) = harness();
    let src = source("s", format!("{}/sub", mock_server.uri()));

    aggregator.run_one(src.clone()).await;
    aggregator.run_one(src).await;

    assert_eq!(store.count_servers().unwrap(), 3);
}

/// Disabled subscriptions are filtered out by the catalog, so no fetch
/// reaches their endpoint
#[tokio::test]
async fn test_disabled_subscription_not_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/enabled"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/disabled"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (aggregator, store) = harness();

    let enabled = Subscription::new("on", format!("{}/enabled", mock_server.uri()));
    let disabled = Subscription {
        enabled: false,
        ..Subscription::new("off", format!("{}/disabled", mock_server.uri()))
    };
    store.add_subscription(&enabled).unwrap();
    store.add_subscription(&disabled).unwrap();

    let catalog = SourceCatalog::default();
    let sources = catalog.user_sources(&store.subscriptions().unwrap());
    assert_eq!(sources.len(), 1);

    let summary = aggregator.run(sources).await;
    assert_eq!(summary.succeeded, 1);
    // mock expectations verified on drop
}

/// Non-success status is a per-source failure, never fatal to the batch
#[tokio::test]
async fn test_http_error_is_isolated_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_links()))
        .mount(&mock_server)
        .await;

    let (aggregator, store) = harness();
    let mut events = aggregator.notifier().subscribe();

    let summary = aggregator
        .run(vec![
            source("gone", format!("{}/gone", mock_server.uri())),
            source("ok", format!("{}/ok", mock_server.uri())),
        ])
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(store.count_servers().unwrap(), 3);

    let mut saw_status_failure = false;
    loop {
        match events.try_recv() {
            Ok(AggregationEvent::Source(e)) => {
                if let SourceOutcome::Failed { reason } = e.outcome {
                    assert_eq!(e.source_id, "gone");
                    assert!(reason.contains("404"), "reason: {reason}");
                    saw_status_failure = true;
                }
            }
            Ok(AggregationEvent::Completed { .. }) | Err(_) => break,
        }
    }
    assert!(saw_status_failure);
}

/// An invalid URL short-circuits before the network and emits exactly
/// one dedicated failure event
#[tokio::test]
async fn test_invalid_url_pre_fetch() {
    let (aggregator, store) = harness();
    let mut events = aggregator.notifier().subscribe();

    let summary = aggregator
        .run(vec![source("bad", "::definitely not a url::".to_string())])
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(store.count_servers().unwrap(), 0);

    let mut invalid_events = 0;
    loop {
        match events.try_recv() {
            Ok(AggregationEvent::Source(e)) => {
                if let SourceOutcome::Failed { reason } = e.outcome {
                    assert!(reason.contains("Invalid URL"));
                    invalid_events += 1;
                }
            }
            Ok(AggregationEvent::Completed { .. }) | Err(_) => break,
        }
    }
    assert_eq!(invalid_events, 1);
}
