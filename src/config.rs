//! Console configuration.
//!
//! Loaded from `~/.wmc/config.toml`. Every key is optional; a missing file
//! means all defaults.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::console::Profile;
use crate::console::assembler::DEFAULT_CAPACITY;
use crate::model::FUNCTION_MAX;
use crate::roster::DEFAULT_CAPACITY as DEFAULT_MAX_LOCOMOTIVES;

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Command set: `wifi` or `bus`.
    pub profile: Profile,

    /// Longest accepted command line in bytes.
    pub line_capacity: usize,

    /// Function buttons per locomotive.
    pub buttons: usize,

    pub max_locomotives: usize,

    /// Echo received characters on device and Telnet transports.
    pub echo: bool,

    pub telnet_port: u16,

    /// Where state is persisted. Defaults to `~/.wmc/state/`.
    pub state_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            line_capacity: DEFAULT_CAPACITY,
            buttons: 5,
            max_locomotives: DEFAULT_MAX_LOCOMOTIVES,
            echo: true,
            telnet_port: 2323,
            state_dir: None,
        }
    }
}

/// Shortest line that still fits every command, including every line `dump`
/// writes.
pub const MIN_LINE_CAPACITY: usize = 24;

impl Config {
    /// Load config from `~/.wmc/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parse and check a TOML document.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;

        if config.line_capacity < MIN_LINE_CAPACITY {
            return Err(format!(
                "line-capacity must be at least {MIN_LINE_CAPACITY}"
            ));
        }
        if config.buttons == 0 || config.buttons > usize::from(FUNCTION_MAX) + 1 {
            return Err(format!(
                "buttons must be 1..{}",
                usize::from(FUNCTION_MAX) + 1
            ));
        }
        if config.max_locomotives == 0 {
            return Err("max-locomotives must be at least 1".to_string());
        }

        Ok(config)
    }

    /// The config file path: `~/.wmc/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wmc").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = Config::parse(
            r#"
            profile = "bus"
            line-capacity = 40
            telnet-port = 23
            "#,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Bus);
        assert_eq!(config.line_capacity, 40);
        assert_eq!(config.telnet_port, 23);
        assert_eq!(config.buttons, 5);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("baud = 115200").is_err());
    }

    #[test]
    fn rejects_out_of_range_sizes() {
        assert!(Config::parse("buttons = 0").is_err());
        assert!(Config::parse("buttons = 30").is_err());
        assert!(Config::parse("line-capacity = 8").is_err());
        assert!(Config::parse("max-locomotives = 0").is_err());
    }
}
