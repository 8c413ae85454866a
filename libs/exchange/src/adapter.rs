//! Metadata exchange protocol adapter.
//!
//! Outbound: get-or-compute the encoded node buffer and install it, plus the
//! plain node id, into the connection's state store under the well-known
//! keys, both read-only with connection lifespan, so every request multiplexed
//! on the connection sees the same identity and nothing downstream can
//! overwrite it.
//!
//! Inbound: read the well-known key and take a zero-copy view. Peers that do
//! not speak the protocol simply have no entry; that is absence, not an
//! error. A corrupt buffer is logged and treated the same way.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use meshmeta_codec::{encode_node, CodecError, NodeView};
use meshmeta_state::{LifeSpan, Mutability, StateError, StateStore, StateValue};
use meshmeta_types::{keys, AttributeMap, NodeInfo};

use crate::cache::NodeCache;
use crate::config::ExchangeConfig;

/// Errors from the outbound exchange path.
///
/// Codec failures mean the local document could not be encoded; state
/// failures mean the well-known keys were already frozen (a wiring bug in
/// the embedding proxy).
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// Which side of the connection an identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downstream,
    Upstream,
}

impl Direction {
    /// State-store key holding the encoded buffer.
    pub const fn metadata_key(self) -> &'static str {
        match self {
            Direction::Downstream => keys::DOWNSTREAM_METADATA_KEY,
            Direction::Upstream => keys::UPSTREAM_METADATA_KEY,
        }
    }

    /// State-store key holding the plain node id.
    pub const fn id_key(self) -> &'static str {
        match self {
            Direction::Downstream => keys::DOWNSTREAM_ID_KEY,
            Direction::Upstream => keys::UPSTREAM_ID_KEY,
        }
    }
}

/// The exchange adapter: one per process, shared across connections.
#[derive(Debug, Default)]
pub struct MetadataExchange {
    cache: Arc<NodeCache>,
    config: ExchangeConfig,
}

impl MetadataExchange {
    pub fn new(config: ExchangeConfig) -> Self {
        Self {
            cache: Arc::new(NodeCache::new()),
            config,
        }
    }

    /// Build against an externally owned cache (e.g. shared with an admin
    /// surface that wants to clear it on config reload).
    pub fn with_cache(cache: Arc<NodeCache>, config: ExchangeConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<NodeCache> {
        &self.cache
    }

    /// Outbound path: encode (cached) and install identity into the store.
    ///
    /// Both entries are `ReadOnly` + `Connection`: set once per connection,
    /// shared by all its requests. A second `inject` on the same store and
    /// direction fails with `AlreadyImmutable`; identity does not change
    /// mid-connection.
    pub fn inject(
        &self,
        store: &mut StateStore,
        direction: Direction,
        node_id: &str,
        attributes: &AttributeMap,
    ) -> Result<(), ExchangeError> {
        let max = self.config.max_encoded_bytes;
        let buffer = self.cache.get_or_compute(node_id, || {
            let node = NodeInfo::from_attributes(attributes);
            let encoded = encode_node(&node)?;
            if encoded.len() > max {
                return Err(CodecError::MessageTooLarge {
                    size: encoded.len(),
                    max,
                });
            }
            Ok(encoded)
        })?;

        store.set(
            direction.metadata_key(),
            StateValue::Bytes(buffer),
            Mutability::ReadOnly,
            LifeSpan::Connection,
        )?;
        store.set(
            direction.id_key(),
            StateValue::Str(node_id.to_string()),
            Mutability::ReadOnly,
            LifeSpan::Connection,
        )?;
        Ok(())
    }

    /// Inbound path: zero-copy view of the peer's identity, if it exchanged
    /// one. Corrupt buffers degrade to `None` with a warning, so the worst case is
    /// missing peer identity for one connection, never a failed request.
    pub fn peer_view<'a>(store: &'a StateStore, direction: Direction) -> Option<NodeView<'a>> {
        match Self::try_peer_view(store, direction) {
            Ok(view) => view,
            Err(error) => {
                warn!(
                    key = direction.metadata_key(),
                    %error,
                    "discarding corrupt peer metadata"
                );
                None
            }
        }
    }

    /// Like [`peer_view`](Self::peer_view) but surfaces the decode error for
    /// callers that count or alert on corrupt peers.
    pub fn try_peer_view<'a>(
        store: &'a StateStore,
        direction: Direction,
    ) -> Result<Option<NodeView<'a>>, CodecError> {
        let Some(value) = store.get_read_only(direction.metadata_key()) else {
            return Ok(None);
        };
        let Some(buffer) = value.as_bytes() else {
            // Wrong value kind under our key; same degradation as corruption.
            return Ok(None);
        };
        NodeView::parse(buffer).map(Some)
    }

    /// The peer's plain node id, if it exchanged one.
    pub fn peer_id<'a>(store: &'a StateStore, direction: Direction) -> Option<&'a str> {
        store
            .get_read_only(direction.id_key())
            .and_then(StateValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn sample_attributes() -> AttributeMap {
        let doc = serde_json::json!({
            "NAME": "test_pod",
            "NAMESPACE": "test_namespace",
            "OWNER": "test_owner",
            "WORKLOAD_NAME": "test_workload",
            "MESH_ID": "test-mesh",
            "LABELS": { "app": "productpage", "version": "v1" },
        });
        AttributeMap::try_from(&doc).unwrap()
    }

    #[test]
    fn test_inject_then_read_back() {
        let exchange = MetadataExchange::new(ExchangeConfig::default());
        let mut store = StateStore::new();

        exchange
            .inject(
                &mut store,
                Direction::Downstream,
                "test_pod.test_namespace",
                &sample_attributes(),
            )
            .unwrap();

        let view = MetadataExchange::peer_view(&store, Direction::Downstream).unwrap();
        assert_eq!(view.workload_name(), "test_workload");
        assert_eq!(view.namespace(), "test_namespace");
        assert_eq!(view.labels().lookup("app"), Some("productpage"));
        assert_eq!(
            MetadataExchange::peer_id(&store, Direction::Downstream),
            Some("test_pod.test_namespace")
        );
    }

    #[test]
    fn test_directions_use_separate_keys() {
        let exchange = MetadataExchange::new(ExchangeConfig::default());
        let mut store = StateStore::new();
        exchange
            .inject(&mut store, Direction::Upstream, "up.ns", &sample_attributes())
            .unwrap();

        assert!(MetadataExchange::peer_view(&store, Direction::Upstream).is_some());
        assert!(MetadataExchange::peer_view(&store, Direction::Downstream).is_none());
        assert_eq!(MetadataExchange::peer_id(&store, Direction::Downstream), None);
    }

    #[test]
    fn test_absent_peer_is_not_an_error() {
        let store = StateStore::new();
        assert!(MetadataExchange::peer_view(&store, Direction::Downstream).is_none());
        assert!(
            MetadataExchange::try_peer_view(&store, Direction::Downstream)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_corrupt_peer_degrades_to_absent() {
        let mut store = StateStore::new();
        store
            .set(
                Direction::Downstream.metadata_key(),
                Bytes::from_static(b"\x00"),
                Mutability::ReadOnly,
                LifeSpan::Connection,
            )
            .unwrap();

        assert!(MetadataExchange::peer_view(&store, Direction::Downstream).is_none());
        assert!(matches!(
            MetadataExchange::try_peer_view(&store, Direction::Downstream),
            Err(CodecError::MessageTooSmall { .. })
        ));
    }

    #[test]
    fn test_second_inject_on_same_connection_fails_loudly() {
        let exchange = MetadataExchange::new(ExchangeConfig::default());
        let mut store = StateStore::new();
        let attrs = sample_attributes();

        exchange
            .inject(&mut store, Direction::Downstream, "test_pod.test_namespace", &attrs)
            .unwrap();
        let err = exchange
            .inject(&mut store, Direction::Downstream, "other.ns", &attrs)
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::State(StateError::AlreadyImmutable { .. })
        ));
    }

    #[test]
    fn test_encode_happens_once_per_identity() {
        let exchange = MetadataExchange::new(ExchangeConfig::default());
        let attrs = sample_attributes();

        for _ in 0..3 {
            let mut store = StateStore::new();
            exchange
                .inject(&mut store, Direction::Downstream, "test_pod.test_namespace", &attrs)
                .unwrap();
        }

        let stats = exchange.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_oversized_encode_rejected_and_not_cached() {
        let exchange = MetadataExchange::new(ExchangeConfig {
            max_encoded_bytes: 64,
        });
        let mut store = StateStore::new();
        let err = exchange
            .inject(
                &mut store,
                Direction::Downstream,
                "test_pod.test_namespace",
                &sample_attributes(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Codec(CodecError::MessageTooLarge { .. })
        ));
        assert!(exchange.cache().is_empty());
        assert!(store.is_empty());
    }
}
