//! # Protocol Configuration
//!
//! Explicit configuration values threaded into the functions that need
//! them. Library crates never read configuration from the environment;
//! process-wide defaults are resolved once by the binary.

use serde::{Deserialize, Serialize};

/// Default bound on legitimation nesting during verification.
pub const DEFAULT_MAX_LEGITIMATION_DEPTH: usize = 16;

/// Parameters of the verification protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolConfig {
    /// Deepest legitimation nesting accepted by a single top-level
    /// verification. A request's direct legitimations sit at depth 1.
    pub max_legitimation_depth: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_legitimation_depth: DEFAULT_MAX_LEGITIMATION_DEPTH,
        }
    }
}

impl ProtocolConfig {
    /// Configuration with a custom legitimation depth bound.
    pub fn with_max_legitimation_depth(max_legitimation_depth: usize) -> Self {
        Self {
            max_legitimation_depth,
        }
    }
}

/// Connection parameters for the ledger collaborator.
///
/// The core protocol does not connect to anything itself; this value is
/// handed to whichever ledger client the embedding application constructs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerConfig {
    /// WebSocket or HTTP endpoint of the ledger node.
    pub endpoint: String,
    /// Seconds to wait for a submitted transaction to be finalized.
    pub submit_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:9944".to_string(),
            submit_timeout_secs: 60,
        }
    }
}
