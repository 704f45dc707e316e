//! Configuration file handling
//!
//! ```toml
//! [receiver]
//! port = 3333
//! bind_addr = "0.0.0.0"
//!
//! [display]
//! width = 1920
//! height = 1080
//! flip_y = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use touchflow_input::Display;
use touchflow_transport::ReceiverConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub receiver: ReceiverConfig,
    pub display: Display,
}

impl FileConfig {
    /// Load from a TOML file; a missing path yields defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .receiver
            .validate()
            .with_context(|| format!("Invalid receiver config in {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_optional() {
        let config: FileConfig = toml::from_str("[display]\nwidth = 640.0\n").unwrap();
        assert_eq!(config.display.width, 640.0);
        assert_eq!(config.display.height, 1080.0);
        assert_eq!(config.receiver, ReceiverConfig::default());
    }

    #[test]
    fn test_no_path_is_default() {
        assert_eq!(FileConfig::load(None).unwrap(), FileConfig::default());
    }
}
