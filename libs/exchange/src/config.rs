//! Exchange configuration.

use serde::Deserialize;

use meshmeta_codec::MAX_ENCODED_SIZE;

/// Tunables for the exchange adapter.
///
/// Deserializable so the host proxy can carry it in its own config file; the
/// defaults are what production runs with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Upper bound on one encoded node buffer. Documents are size-limited
    /// upstream, so hitting this means a misconfigured peer, not load.
    pub max_encoded_bytes: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_encoded_bytes: MAX_ENCODED_SIZE,
        }
    }
}
