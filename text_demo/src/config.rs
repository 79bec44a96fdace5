//! Demo configuration loaded from `text_demo.toml`

use serde::Deserialize;
use std::path::Path;

/// Config loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config {0}: {1}")]
    Read(String, #[source] std::io::Error),

    /// The config file is not valid TOML
    #[error("failed to parse config {0}: {1}")]
    Parse(String, #[source] toml::de::Error),
}

/// Window and font settings for the demo
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
    /// Path to a TTF/OTF font file
    pub font_path: String,
    /// Glyph rasterization size in pixels
    pub font_size: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Ember Render - Text Demo".to_string(),
            font_path: "fonts/default.ttf".to_string(),
            font_size: 48.0,
        }
    }
}

impl DemoConfig {
    /// Load the config file, falling back to defaults when it is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.font_size, 48.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DemoConfig = toml::from_str("width = 1280\nfont_size = 32.0").unwrap();
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 600);
        assert_eq!(config.font_size, 32.0);
        assert_eq!(config.font_path, "fonts/default.ttf");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = DemoConfig::load("/no/such/text_demo.toml").unwrap();
        assert_eq!(config.width, 800);
    }
}
