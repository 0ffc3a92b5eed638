//! # Configuration File
//!
//! Optional YAML file read once at startup. A missing file means defaults;
//! command-line flags take precedence over anything read here.
//!
//! ```yaml
//! protocol:
//!   maxLegitimationDepth: 8
//! ledger:
//!   endpoint: ws://node:9944
//! log:
//!   format: json
//!   filter: kredo_vc=debug
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use kredo_core::{LedgerConfig, ProtocolConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives used when neither `RUST_LOG` nor `-v` is given.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KredoConfig {
    pub protocol: ProtocolConfig,
    pub ledger: LedgerConfig,
    pub log: LogConfig,
}

impl KredoConfig {
    /// Load `path`, or defaults when no path is given or the file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = KredoConfig::from_yaml("protocol:\n  maxLegitimationDepth: 4\nlog:\n  format: json\n")
            .unwrap();
        assert_eq!(cfg.protocol.max_legitimation_depth, 4);
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.ledger, LedgerConfig::default());
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = KredoConfig::load(Some(Path::new("/nonexistent/kredo.yaml"))).unwrap();
        assert_eq!(cfg, KredoConfig::default());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(KredoConfig::from_yaml("log:\n  format: xml\n").is_err());
    }
}
