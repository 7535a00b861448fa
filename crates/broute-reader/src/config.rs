//! Reader configuration.
//!
//! Wait budgets are counted in expired transport reads. With the usual
//! 1-second serial timeout, a budget of 30 is roughly 30 seconds.
//!
//! Settings can be loaded from YAML:
//!
//! ```yaml
//! credentials:
//!   route_b_id: "00112233445566778899AABBCCDDEEFF"
//!   password: "0123456789AB"
//! reader:
//!   scan_budget: 60
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReaderResult;

/// Default budget for plain command acknowledgments.
pub const DEFAULT_COMMAND_BUDGET: u32 = 1;
/// Default budget for the whole scan step.
pub const DEFAULT_SCAN_BUDGET: u32 = 30;
/// Default cap on scan cycles before giving up.
pub const DEFAULT_MAX_SCAN_CYCLES: u32 = 10;
/// Default budget for the PANA join.
pub const DEFAULT_JOIN_BUDGET: u32 = 30;
/// Default budget for a property read.
pub const DEFAULT_READ_BUDGET: u32 = 20;
/// Default budget for a property write acknowledgment.
pub const DEFAULT_WRITE_BUDGET: u32 = 1;

/// Route-B credentials issued by the electricity distributor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Route-B authentication id.
    pub route_b_id: String,
    /// Route-B password.
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(route_b_id: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            route_b_id: route_b_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("route_b_id", &self.route_b_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Wait budgets for each kind of exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Empty reads allowed while waiting for a command's `OK`.
    pub command_budget: u32,
    /// Empty reads allowed across the whole scan step.
    pub scan_budget: u32,
    /// Scan cycles (`EVENT 22`) allowed before a complete PAN is found.
    pub max_scan_cycles: u32,
    /// Empty reads allowed while waiting for PANA to complete.
    pub join_budget: u32,
    /// Default empty reads allowed while waiting for a read response.
    pub read_budget: u32,
    /// Empty reads allowed while waiting for a write's `OK`.
    pub write_budget: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            command_budget: DEFAULT_COMMAND_BUDGET,
            scan_budget: DEFAULT_SCAN_BUDGET,
            max_scan_cycles: DEFAULT_MAX_SCAN_CYCLES,
            join_budget: DEFAULT_JOIN_BUDGET,
            read_budget: DEFAULT_READ_BUDGET,
            write_budget: DEFAULT_WRITE_BUDGET,
        }
    }
}

/// Everything needed to connect to a meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSettings {
    /// Route-B credentials.
    pub credentials: Credentials,
    /// Wait budgets.
    #[serde(default)]
    pub reader: ReaderConfig,
}

impl ConnectionSettings {
    /// Parse settings from YAML text.
    pub fn from_yaml_str(text: &str) -> ReaderResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ReaderResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.command_budget, 1);
        assert_eq!(config.scan_budget, 30);
        assert_eq!(config.join_budget, 30);
        assert_eq!(config.read_budget, 20);
        assert_eq!(config.write_budget, 1);
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r#"
credentials:
  route_b_id: "00112233445566778899AABBCCDDEEFF"
  password: "0123456789AB"
reader:
  scan_budget: 60
  read_budget: 5
"#;
        let settings = ConnectionSettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.credentials.route_b_id, "00112233445566778899AABBCCDDEEFF");
        assert_eq!(settings.credentials.password, "0123456789AB");
        assert_eq!(settings.reader.scan_budget, 60);
        assert_eq!(settings.reader.read_budget, 5);
        // Unspecified budgets keep their defaults
        assert_eq!(settings.reader.join_budget, DEFAULT_JOIN_BUDGET);
    }

    #[test]
    fn test_settings_reader_section_optional() {
        let yaml = "credentials:\n  route_b_id: ABC\n  password: XYZ\n";
        let settings = ConnectionSettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.reader, ReaderConfig::default());
    }

    #[test]
    fn test_settings_rejects_unknown_fields() {
        let yaml = "credentials:\n  route_b_id: ABC\n  password: XYZ\n  pin: 1234\n";
        assert!(ConnectionSettings::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ABC", "secret-password");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ABC"));
        assert!(!debug.contains("secret-password"));
    }
}
