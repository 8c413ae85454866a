//! # Meshmeta Codec - Binary Node Identity Protocol
//!
//! ## Purpose
//!
//! Converts a [`NodeInfo`](meshmeta_types::NodeInfo) into a flat,
//! self-contained binary buffer and back. The buffer is designed so a reader
//! can locate any top-level field, and look up individual label keys, without
//! scanning the whole buffer or building an intermediate object graph.
//!
//! ## Wire Format (version 1, little-endian)
//!
//! ```text
//! ┌──────────────┬───────────────┬────────────────┬─────────────┐
//! │ NodeHeader   │ Directory     │ Map Tables     │ Data Region │
//! │ (16 bytes)   │ (8 × 8 bytes) │ (n × 16 bytes) │ (UTF-8)     │
//! └──────────────┴───────────────┴────────────────┴─────────────┘
//! ```
//!
//! - The header carries magic, version, payload size, and a CRC32 of the
//!   payload (everything after the header).
//! - The directory has one fixed slot per field: name, namespace, owner,
//!   workload_name, mesh_id, cluster_id, labels, platform_metadata. String
//!   slots reference the data region directly; map slots reference a map
//!   table and carry the entry count.
//! - Map tables are sorted strictly ascending by key bytes, so
//!   [`MapView::lookup`] is a binary search.
//! - All offsets are relative to the payload start and bounds-checked once at
//!   [`NodeView::parse`]; accessors after that are infallible and zero-copy.
//!
//! Encoding the same logical content always produces the same bytes (maps are
//! sorted, field order is fixed), and decoding never reads past the buffer.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod view;

// Re-export key types for convenience
pub use encoder::encode_node;
pub use error::{CodecError, CodecResult};
pub use layout::{NodeHeader, FORMAT_VERSION, MAX_ENCODED_SIZE, NODE_MAGIC};
pub use view::{MapView, NodeView};
