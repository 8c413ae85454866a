//! End-to-end exchange flow: document → attribute map → cached encode →
//! state store → zero-copy peer view.

use meshmeta_exchange::{Direction, ExchangeConfig, MetadataExchange};
use meshmeta_state::StateStore;
use meshmeta_types::AttributeMap;

fn node_document() -> AttributeMap {
    let doc = serde_json::json!({
        "NAME": "test_pod",
        "NAMESPACE": "test_namespace",
        "LABELS": {
            "app": "productpage",
            "version": "v1",
            "pod-template-hash": "84975bc778",
        },
        "OWNER": "test_owner",
        "WORKLOAD_NAME": "test_workload",
        "PLATFORM_METADATA": {
            "gcp_project": "test_project",
            "gcp_cluster_location": "test_location",
            "gcp_cluster_name": "test_cluster",
        },
        "MESH_ID": "test-mesh",
    });
    AttributeMap::try_from(&doc).unwrap()
}

#[test]
fn full_exchange_round_trip() {
    let exchange = MetadataExchange::new(ExchangeConfig::default());
    let mut connection = StateStore::new();

    exchange
        .inject(
            &mut connection,
            Direction::Downstream,
            "test_pod.test_namespace",
            &node_document(),
        )
        .unwrap();

    // Any later filter on the connection reads the identity without decoding
    // into an intermediate object graph.
    let peer = MetadataExchange::peer_view(&connection, Direction::Downstream).unwrap();
    assert_eq!(peer.workload_name(), "test_workload");
    assert_eq!(peer.namespace(), "test_namespace");
    assert_eq!(peer.owner(), "test_owner");
    assert_eq!(peer.mesh_id(), "test-mesh");
    assert_eq!(peer.labels().lookup("app"), Some("productpage"));
    assert_eq!(peer.labels().lookup("version"), Some("v1"));
    assert_eq!(
        peer.platform_metadata().lookup("gcp_cluster_name"),
        Some("test_cluster")
    );
    assert_eq!(
        MetadataExchange::peer_id(&connection, Direction::Downstream),
        Some("test_pod.test_namespace")
    );
}

#[test]
fn identity_survives_requests_but_not_the_connection() {
    let exchange = MetadataExchange::new(ExchangeConfig::default());
    let mut connection = StateStore::new();
    exchange
        .inject(
            &mut connection,
            Direction::Downstream,
            "test_pod.test_namespace",
            &node_document(),
        )
        .unwrap();

    // Requests come and go on the connection; the identity stays.
    for _ in 0..3 {
        connection.end_request();
        assert!(MetadataExchange::peer_view(&connection, Direction::Downstream).is_some());
    }

    // A new connection starts with no exchanged identity.
    drop(connection);
    let fresh = StateStore::new();
    assert!(MetadataExchange::peer_view(&fresh, Direction::Downstream).is_none());
}

#[test]
fn cache_is_shared_across_connections() {
    let exchange = MetadataExchange::new(ExchangeConfig::default());
    let attrs = node_document();

    for _ in 0..5 {
        let mut connection = StateStore::new();
        exchange
            .inject(
                &mut connection,
                Direction::Downstream,
                "test_pod.test_namespace",
                &attrs,
            )
            .unwrap();
    }
    let stats = exchange.cache().stats();
    assert_eq!(stats.misses, 1, "one encode for five connections");
    assert_eq!(stats.hits, 4);

    // Whole-cache invalidation is the only eviction.
    exchange.cache().clear();
    let mut connection = StateStore::new();
    exchange
        .inject(
            &mut connection,
            Direction::Downstream,
            "test_pod.test_namespace",
            &attrs,
        )
        .unwrap();
    assert_eq!(exchange.cache().stats().misses, 2);
}
