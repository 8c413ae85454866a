//! # Meshmeta Types - Node Identity Data Layer
//!
//! ## Purpose
//!
//! Pure data structures for the metadata exchange core: the generic attribute
//! map produced by an external document parser, the owned `NodeInfo` identity
//! record extracted from it, and the well-known keys shared by every crate in
//! the workspace.
//!
//! ## Architecture Role
//!
//! ```text
//! External Parser → [meshmeta-types] → meshmeta-codec → meshmeta-exchange
//!       ↓                 ↓                  ↓                ↓
//!  JSON Document     AttributeMap       Binary Buffer    State Store Keys
//!                    NodeInfo           (zero-copy)      Cache Entries
//! ```
//!
//! This crate holds no protocol or transport logic; it only defines the
//! shapes the other crates agree on.

pub mod attribute;
pub mod keys;
pub mod node;

// Re-export key types for convenience
pub use attribute::{AttributeMap, AttributeValue, DocumentError};
pub use node::NodeInfo;
