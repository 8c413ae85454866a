//! Well-known keys shared across the metadata exchange.
//!
//! Document keys name the top-level fields of the metadata document the
//! external parser hands us. State keys are the filter-state slots the
//! exchange adapter writes and peers read.

/// Workload instance name in the metadata document.
pub const NAME_KEY: &str = "NAME";
/// Namespace the workload runs in.
pub const NAMESPACE_KEY: &str = "NAMESPACE";
/// Owning controller resource (deployment, job, ...).
pub const OWNER_KEY: &str = "OWNER";
/// Logical workload name, shared by all replicas.
pub const WORKLOAD_NAME_KEY: &str = "WORKLOAD_NAME";
/// Mesh identifier the workload belongs to.
pub const MESH_ID_KEY: &str = "MESH_ID";
/// Platform-scoped cluster identifier.
pub const CLUSTER_ID_KEY: &str = "CLUSTER_ID";
/// Workload labels sub-map.
pub const LABELS_KEY: &str = "LABELS";
/// Platform metadata sub-map (cloud project, location, ...).
pub const PLATFORM_METADATA_KEY: &str = "PLATFORM_METADATA";

/// Encoded peer metadata written by the downstream (client) proxy.
pub const DOWNSTREAM_METADATA_KEY: &str = "mesh.exchange.downstream";
/// Plain node id written by the downstream proxy.
pub const DOWNSTREAM_ID_KEY: &str = "mesh.exchange.downstream_id";
/// Encoded peer metadata written by the upstream (server) proxy.
pub const UPSTREAM_METADATA_KEY: &str = "mesh.exchange.upstream";
/// Plain node id written by the upstream proxy.
pub const UPSTREAM_ID_KEY: &str = "mesh.exchange.upstream_id";
