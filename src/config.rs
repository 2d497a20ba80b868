//! Site configuration.
//!
//! Loaded from TOML (an inline `<script type="application/toml">` block on the
//! page, or a string in tests). Every key is optional:
//!
//! ```toml
//! base_path = "/roster/"
//! chars_tab = "chars"
//! deep_link_timeout_ms = 5000
//! swipe_threshold_px = 40.0
//!
//! [[tabs]]
//! id = "tab-world"
//! panel = "panel-world"
//! token = "world"
//!
//! [[tabs]]
//! id = "tab-chars"
//! panel = "panel-chars"
//! token = "chars"
//!
//! [[sources]]
//! id = "data/characters.json"
//! target = "chars-main"
//! ```

use serde::Deserialize;

use crate::paths::BasePath;
use crate::platform::Duration;

pub const DEFAULT_DEEP_LINK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 40.0;
pub const DEFAULT_CHARS_TAB: &str = "chars";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{name} must be in range [{min}, {max}], got {got}")]
    OutOfRange {
        name: &'static str,
        min: String,
        max: String,
        got: String,
    },
    #[error("at least one tab must be configured")]
    NoTabs,
    #[error("duplicate tab {0}")]
    DuplicateTab(String),
    #[error("chars_tab token '{0}' does not match any configured tab")]
    UnknownCharsTab(String),
    #[error("source #{0} has an empty id")]
    EmptySource(usize),
}

/// One panel in the tab group.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TabDescriptor {
    /// DOM id of the tab button.
    pub id: String,
    /// DOM id of the panel it controls.
    pub panel: String,
    /// Short fragment token (`#tab=<token>`).
    pub token: String,
}

impl TabDescriptor {
    pub fn new(id: &str, panel: &str, token: &str) -> Self {
        TabDescriptor {
            id: id.to_string(),
            panel: panel.to_string(),
            token: token.to_string(),
        }
    }
}

/// A data document and the element its catalog renders into.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CatalogSource {
    /// Document reference as authored (also shown in error messages).
    pub id: String,
    /// Render target identifier (DOM id, or positional key in the adapter).
    #[serde(default)]
    pub target: String,
}

impl CatalogSource {
    pub fn new(id: &str, target: &str) -> Self {
        CatalogSource {
            id: id.to_string(),
            target: target.to_string(),
        }
    }
}

fn default_tabs() -> Vec<TabDescriptor> {
    vec![
        TabDescriptor::new("tab-world", "panel-world", "world"),
        TabDescriptor::new("tab-chars", "panel-chars", DEFAULT_CHARS_TAB),
    ]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_path: String,
    pub tabs: Vec<TabDescriptor>,
    pub chars_tab: String,
    pub sources: Vec<CatalogSource>,
    pub deep_link_timeout_ms: u64,
    pub swipe_threshold_px: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            base_path: "/".to_string(),
            tabs: default_tabs(),
            chars_tab: DEFAULT_CHARS_TAB.to_string(),
            sources: Vec::new(),
            deep_link_timeout_ms: DEFAULT_DEEP_LINK_TIMEOUT_MS,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &'static str) -> Result<T, ConfigError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(ConfigError::OutOfRange {
            name,
            min: min.to_string(),
            max: max.to_string(),
            got: val.to_string(),
        })
    } else {
        Ok(val)
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SiteConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_in_range(self.deep_link_timeout_ms, 100, 60_000, "deep_link_timeout_ms")?;
        validate_in_range(self.swipe_threshold_px, 1.0, 500.0, "swipe_threshold_px")?;

        if self.tabs.is_empty() {
            return Err(ConfigError::NoTabs);
        }
        for (i, tab) in self.tabs.iter().enumerate() {
            if self.tabs[..i].iter().any(|t| t.id == tab.id || t.token == tab.token) {
                return Err(ConfigError::DuplicateTab(tab.id.clone()));
            }
        }
        if !self.tabs.iter().any(|t| t.token == self.chars_tab) {
            return Err(ConfigError::UnknownCharsTab(self.chars_tab.clone()));
        }
        if let Some(i) = self.sources.iter().position(|s| s.id.trim().is_empty()) {
            return Err(ConfigError::EmptySource(i));
        }
        Ok(())
    }

    pub fn base(&self) -> BasePath {
        BasePath::new(&self.base_path)
    }

    pub fn deep_link_timeout(&self) -> Duration {
        Duration::from_millis(self.deep_link_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = SiteConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.tabs.len(), 2);
        assert_eq!(cfg.deep_link_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.swipe_threshold_px, 40.0);
        assert_eq!(cfg.base().as_str(), "/");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = SiteConfig::from_toml_str(
            r#"
            base_path = "/roster"

            [[sources]]
            id = "data/characters.json"
            target = "chars-main"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.base().as_str(), "/roster/");
        assert_eq!(cfg.sources, vec![CatalogSource::new("data/characters.json", "chars-main")]);
        assert_eq!(cfg.chars_tab, "chars");
        assert_eq!(cfg.deep_link_timeout_ms, DEFAULT_DEEP_LINK_TIMEOUT_MS);
    }

    #[test]
    fn test_out_of_range_timeout() {
        let err = SiteConfig::from_toml_str("deep_link_timeout_ms = 10").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { name: "deep_link_timeout_ms", .. }));
        assert!(err.to_string().contains("[100, 60000]"));
    }

    #[test]
    fn test_chars_tab_must_exist() {
        let err = SiteConfig::from_toml_str(r#"chars_tab = "people""#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCharsTab(ref t) if t == "people"));
    }

    #[test]
    fn test_duplicate_tab_token() {
        let err = SiteConfig::from_toml_str(
            r#"
            [[tabs]]
            id = "a"
            panel = "pa"
            token = "chars"

            [[tabs]]
            id = "b"
            panel = "pb"
            token = "chars"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTab(ref id) if id == "b"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = SiteConfig::from_toml_str("base_path = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
