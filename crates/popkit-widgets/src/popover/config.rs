#![forbid(unsafe_code)]

//! Popover options.
//!
//! [`PopoverConfig`] carries the caller-facing options that are plain data.
//! With the `config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! initially_visible = true
//! suppress_close_button = false
//! header = "Filters"
//! class_name = "toolbar-popover"
//! ```
//!
//! ```rust,ignore
//! let config = PopoverConfig::from_toml_file("popover.toml")?;
//! ```
//!
//! Missing keys take their [`Default`] values.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Options recognized by a popover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PopoverConfig {
    /// Start in the open state.
    pub initially_visible: bool,
    /// Omit the close affordance from the panel.
    pub suppress_close_button: bool,
    /// Text rendered above the panel body.
    pub header: Option<String>,
    /// Extra classes for the wrapper, whitespace separated.
    pub class_name: Option<String>,
}

impl PopoverConfig {
    #[must_use]
    pub fn initially_visible(mut self, visible: bool) -> Self {
        self.initially_visible = visible;
        self
    }

    #[must_use]
    pub fn suppress_close_button(mut self, suppress: bool) -> Self {
        self.suppress_close_button = suppress;
        self
    }

    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PopoverConfigError> {
        toml::from_str(s).map_err(PopoverConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PopoverConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PopoverConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, PopoverConfigError> {
        serde_json::from_str(s).map_err(PopoverConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PopoverConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PopoverConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Errors from loading a [`PopoverConfig`].
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum PopoverConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
}

#[cfg(feature = "config")]
impl std::fmt::Display for PopoverConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error reading popover config: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error in popover config: {e}"),
            Self::Json(e) => write!(f, "JSON parse error in popover config: {e}"),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for PopoverConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_closed_with_close_button() {
        let config = PopoverConfig::default();
        assert!(!config.initially_visible);
        assert!(!config.suppress_close_button);
        assert_eq!(config.header, None);
        assert_eq!(config.class_name, None);
    }

    #[test]
    fn builder_sets_fields() {
        let config = PopoverConfig::default()
            .initially_visible(true)
            .suppress_close_button(true)
            .header("Filters")
            .class_name("a b");
        assert!(config.initially_visible);
        assert!(config.suppress_close_button);
        assert_eq!(config.header.as_deref(), Some("Filters"));
        assert_eq!(config.class_name.as_deref(), Some("a b"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_partial_uses_defaults() {
        let config = PopoverConfig::from_toml_str("header = \"Share\"\n").unwrap();
        assert_eq!(config, PopoverConfig::default().header("Share"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_roundtrip() {
        let config = PopoverConfig::default().initially_visible(true).class_name("x");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PopoverConfig::from_json_str(&json).unwrap(), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn bad_input_reports_format() {
        let err = PopoverConfig::from_toml_str("initially_visible = 3").unwrap_err();
        assert!(matches!(err, PopoverConfigError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));

        let err = PopoverConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, PopoverConfigError::Json(_)));
    }

    #[cfg(feature = "config")]
    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("popover.toml");
        std::fs::write(&toml_path, "suppress_close_button = true\n").unwrap();
        let config = PopoverConfig::from_toml_file(&toml_path).unwrap();
        assert!(config.suppress_close_button);

        let missing = PopoverConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, PopoverConfigError::Io(_)));
    }
}
