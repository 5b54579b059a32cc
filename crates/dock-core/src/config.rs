#![forbid(unsafe_code)]

//! Static layout configuration.
//!
//! Captures the settings a host supplies when it builds a layout: header
//! visibility and button toggles, pixel dimensions used by the solver and the
//! drop-zone geometry, and button labels. A [`LayoutConfig`] can be built in
//! code or loaded from TOML/JSON; every section defaults field by field, so a
//! partial document only overrides what it names.
//!
//! ```toml
//! [settings]
//! show_popout_icon = false
//!
//! [dimensions]
//! header_height = 24
//!
//! [header]
//! show = "left"
//! ```
//!
//! ```rust,ignore
//! let config = LayoutConfig::from_toml_file("layout.toml")?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration object consumed by the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Behavioural toggles.
    pub settings: Settings,
    /// Pixel dimensions.
    pub dimensions: Dimensions,
    /// Header button labels.
    pub labels: Labels,
    /// Layout-wide header override, applied on top of `settings`.
    pub header: Option<HeaderOverride>,
}

impl LayoutConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all values are usable.
    ///
    /// Returns a list of findings. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let d = &self.dimensions;

        let positive = [
            ("dimensions.header_height", d.header_height),
            ("dimensions.min_item_width", d.min_item_width),
            ("dimensions.min_item_height", d.min_item_height),
            ("dimensions.tab_width", d.tab_width),
            ("dimensions.tab_placeholder_width", d.tab_placeholder_width),
            ("dimensions.tab_placeholder_height", d.tab_placeholder_height),
            ("dimensions.root_edge_size", d.root_edge_size),
        ];
        for (name, value) in positive {
            if value <= 0 {
                errors.push(format!("{name} must be > 0, got {value}"));
            }
        }
        if d.border_width < 0 {
            errors.push(format!(
                "dimensions.border_width must be >= 0, got {}",
                d.border_width
            ));
        }

        let s = &self.settings;
        let l = &self.labels;
        let labelled = [
            ("labels.close", s.show_close_icon, &l.close),
            ("labels.maximise", s.show_maximise_icon, &l.maximise),
            ("labels.popout", s.show_popout_icon, &l.popout),
            ("labels.dock", s.show_dock_icon, &l.dock),
        ];
        for (name, enabled, label) in labelled {
            if enabled && label.trim().is_empty() {
                errors.push(format!("{name} must not be empty while its button is shown"));
            }
        }
        if l.minimise.trim().is_empty() {
            errors.push("labels.minimise must not be empty".to_string());
        }

        errors
    }

    /// Validate and return `self`, or every finding as one error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Behavioural toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether stacks render a tab header at all.
    pub has_headers: bool,
    /// Whether tabs can be dragged out of and within stacks.
    pub reorder_enabled: bool,
    pub show_popout_icon: bool,
    pub show_maximise_icon: bool,
    pub show_close_icon: bool,
    /// Docking is opt-in.
    pub show_dock_icon: bool,
    /// Clamp drag pointer coordinates into the container area.
    pub constrain_drag_to_container: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            has_headers: true,
            reorder_enabled: true,
            show_popout_icon: true,
            show_maximise_icon: true,
            show_close_icon: true,
            show_dock_icon: false,
            constrain_drag_to_container: true,
        }
    }
}

/// Pixel dimensions used by the size solver and drop-zone geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    /// Splitter thickness between siblings of a row or column.
    pub border_width: i32,
    pub min_item_width: i32,
    pub min_item_height: i32,
    /// Header strip thickness; also the collapsed size of a docked stack.
    pub header_height: i32,
    /// Extent of a tab along the header when the host has not measured it.
    pub tab_width: i32,
    pub tab_placeholder_width: i32,
    pub tab_placeholder_height: i32,
    /// Thickness of the root edge drop strips.
    pub root_edge_size: i32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            border_width: 5,
            min_item_width: 10,
            min_item_height: 10,
            header_height: 20,
            tab_width: 100,
            tab_placeholder_width: 100,
            tab_placeholder_height: 20,
            root_edge_size: 50,
        }
    }
}

/// Header button labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub close: String,
    pub maximise: String,
    pub minimise: String,
    pub popout: String,
    pub dock: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            close: "close".to_string(),
            maximise: "maximise".to_string(),
            minimise: "minimise".to_string(),
            popout: "open in new window".to_string(),
            dock: "dock".to_string(),
        }
    }
}

/// Edge of a stack the header strip is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderSide {
    #[default]
    Top,
    Left,
    Right,
    Bottom,
}

impl HeaderSide {
    /// Left/right headers lay their tabs out vertically.
    #[must_use]
    pub const fn is_sided(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Header visibility: a plain flag or the side to show it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderShow {
    Flag(bool),
    Side(HeaderSide),
}

/// A header button setting: `false` hides it, `true` uses the default
/// label, a string shows it with that label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderLabel {
    Flag(bool),
    Label(String),
}

/// One layer of header settings. `None` fields inherit from earlier layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOverride {
    pub show: Option<HeaderShow>,
    pub popout: Option<HeaderLabel>,
    pub maximise: Option<HeaderLabel>,
    pub close: Option<HeaderLabel>,
    pub minimise: Option<HeaderLabel>,
    pub dock: Option<HeaderLabel>,
}

/// Errors that can occur when loading a layout configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation findings.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
