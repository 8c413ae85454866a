//! # Meshmeta Exchange - Cache and Protocol Adapter
//!
//! ## Purpose
//!
//! Wires the codec and the state store together: a process-wide per-node
//! cache guaranteeing each distinct node identity is encoded at most once per
//! cache generation, and the adapter that installs the encoded buffer (plus
//! the plain node id) into a connection's state store on the way out, and
//! decodes a peer's buffer on the way in.
//!
//! ## Architecture Role
//!
//! ```text
//! AttributeMap → [NodeCache / encode once] → StateStore keys → peer reads
//!      ↓                   ↓                       ↓                ↓
//!  Document          Shared Bytes           mesh.exchange.*    NodeView
//! ```
//!
//! The cache is shared across workers (sharded concurrent map); the state
//! store side is scope-local. Missing peer metadata is a normal condition;
//! corrupt peer metadata degrades to "no identity" with a warning, never an
//! error on the request path.

pub mod adapter;
pub mod cache;
pub mod config;

// Re-export key types for convenience
pub use adapter::{Direction, ExchangeError, MetadataExchange};
pub use cache::{CacheStats, NodeCache};
pub use config::ExchangeConfig;
