#![forbid(unsafe_code)]

//! Presentation constants for a [`Runtime`](crate::Runtime).
//!
//! Everything here is a default: node descriptors that set the matching
//! option explicitly win over the config.
//!
//! With the `config-file` feature the config can be loaded from TOML:
//!
//! ```toml
//! menu_gap = 12.0
//! menu_close_on_escape = false
//! choice_rows = [3, 8]
//! ```

/// Runtime-wide defaults for node builders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default, deny_unknown_fields))]
pub struct RuntimeConfig {
    /// Margin kept between an open menu panel and the viewport edges, and
    /// between the panel and its trigger.
    pub menu_gap: f64,
    /// CSS `max-width` of a menu panel.
    pub menu_max_width: String,
    /// CSS `max-height` of a menu panel.
    pub menu_max_height: String,
    /// CSS `min-width` of the host inside a menu panel.
    pub menu_host_min_width: String,
    /// CSS `background` of a menu panel.
    pub menu_background: String,
    /// CSS `border` of a menu panel.
    pub menu_border: String,
    pub menu_border_radius: String,
    pub menu_box_shadow: String,
    /// CSS `flex` of each element wrapper in a wrapping list of views.
    pub list_flex_basis: String,
    /// Visible rows of a non-dropdown choice list, as `(min, max)`.
    pub choice_rows: (u32, u32),
    /// Whether Escape closes a dialog when the node does not say.
    pub dialog_close_on_escape: bool,
    /// Whether Escape closes a menu when the node does not say.
    pub menu_close_on_escape: bool,
    /// Whether dialogs open modally when the node does not say.
    pub dialog_modal: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            menu_gap: 8.0,
            menu_max_width: "min(90vw, 640px)".to_owned(),
            menu_max_height: "80vh".to_owned(),
            menu_host_min_width: "220px".to_owned(),
            menu_background: "var(--menu-bg, #fff)".to_owned(),
            menu_border: "1px solid var(--menu-border, rgba(0,0,0,.12))".to_owned(),
            menu_border_radius: "8px".to_owned(),
            menu_box_shadow: "0 8px 30px rgba(0,0,0,.2)".to_owned(),
            list_flex_basis: "1 1 12rem".to_owned(),
            choice_rows: (2, 10),
            dialog_close_on_escape: false,
            menu_close_on_escape: true,
            dialog_modal: true,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn menu_gap(mut self, gap: f64) -> Self {
        self.menu_gap = gap;
        self
    }

    #[must_use]
    pub fn menu_max_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.menu_max_width = width.into();
        self.menu_max_height = height.into();
        self
    }

    #[must_use]
    pub fn menu_host_min_width(mut self, width: impl Into<String>) -> Self {
        self.menu_host_min_width = width.into();
        self
    }

    /// Panel chrome: `background`, `border`, `border-radius` and
    /// `box-shadow`.
    #[must_use]
    pub fn menu_chrome(
        mut self,
        background: impl Into<String>,
        border: impl Into<String>,
        radius: impl Into<String>,
        shadow: impl Into<String>,
    ) -> Self {
        self.menu_background = background.into();
        self.menu_border = border.into();
        self.menu_border_radius = radius.into();
        self.menu_box_shadow = shadow.into();
        self
    }

    #[must_use]
    pub fn list_flex_basis(mut self, flex: impl Into<String>) -> Self {
        self.list_flex_basis = flex.into();
        self
    }

    /// Visible row bounds for list-mode choice lists. `min` is raised to 1
    /// and `max` to `min` if needed.
    #[must_use]
    pub fn choice_rows(mut self, min: u32, max: u32) -> Self {
        let min = min.max(1);
        self.choice_rows = (min, max.max(min));
        self
    }

    #[must_use]
    pub fn dialog_close_on_escape(mut self, close: bool) -> Self {
        self.dialog_close_on_escape = close;
        self
    }

    #[must_use]
    pub fn menu_close_on_escape(mut self, close: bool) -> Self {
        self.menu_close_on_escape = close;
        self
    }

    #[must_use]
    pub fn dialog_modal(mut self, modal: bool) -> Self {
        self.dialog_modal = modal;
        self
    }

    /// Visible rows for a list-mode choice list holding `count` options.
    #[must_use]
    pub fn rows_for(&self, count: usize) -> u32 {
        let (min, max) = self.choice_rows;
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        count.clamp(min, max.max(min))
    }
}

#[cfg(feature = "config-file")]
mod file {
    use super::RuntimeConfig;
    use std::path::Path;

    /// Errors from loading a [`RuntimeConfig`] file.
    #[derive(Debug)]
    pub enum ConfigError {
        Io(std::io::Error),
        Parse(toml::de::Error),
    }

    impl std::fmt::Display for ConfigError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Io(err) => write!(f, "cannot read runtime config: {err}"),
                Self::Parse(err) => write!(f, "invalid runtime config: {err}"),
            }
        }
    }

    impl std::error::Error for ConfigError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Io(err) => Some(err),
                Self::Parse(err) => Some(err),
            }
        }
    }

    impl RuntimeConfig {
        /// Parse a config from TOML text. Missing keys keep their defaults.
        pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
            toml::from_str(text).map_err(ConfigError::Parse)
        }

        /// Read and parse a TOML config file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
            Self::from_toml_str(&text)
        }
    }
}

#[cfg(feature = "config-file")]
pub use file::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builder_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.menu_gap, 8.0);
        assert_eq!(config.choice_rows, (2, 10));
        assert!(config.menu_close_on_escape);
        assert!(!config.dialog_close_on_escape);
        assert!(config.dialog_modal);
        assert_eq!(config.menu_border_radius, "8px");
        assert_eq!(config.menu_background, "var(--menu-bg, #fff)");
    }

    #[test]
    fn menu_chrome_replaces_all_four() {
        let config = RuntimeConfig::new().menu_chrome("#222", "none", "0", "none");
        assert_eq!(config.menu_background, "#222");
        assert_eq!(config.menu_border, "none");
        assert_eq!(config.menu_border_radius, "0");
        assert_eq!(config.menu_box_shadow, "none");
        assert_eq!(config.menu_max_width, "min(90vw, 640px)");
    }

    #[test]
    fn rows_are_clamped() {
        let config = RuntimeConfig::default();
        assert_eq!(config.rows_for(0), 2);
        assert_eq!(config.rows_for(5), 5);
        assert_eq!(config.rows_for(50), 10);
    }

    #[test]
    fn choice_rows_setter_keeps_bounds_ordered() {
        let config = RuntimeConfig::new().choice_rows(0, 0);
        assert_eq!(config.choice_rows, (1, 1));
        let config = RuntimeConfig::new().choice_rows(6, 3);
        assert_eq!(config.choice_rows, (6, 6));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_overrides_only_named_keys() {
        let config = RuntimeConfig::from_toml_str(
            r#"
menu_gap = 12.0
choice_rows = [3, 8]
"#,
        )
        .unwrap();
        assert_eq!(config.menu_gap, 12.0);
        assert_eq!(config.choice_rows, (3, 8));
        assert_eq!(config.list_flex_basis, "1 1 12rem");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RuntimeConfig::from_toml_str("menu_gapp = 1.0").is_err());
    }
}
