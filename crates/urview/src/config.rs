//! Configuration for urview.
//!
//! Loads config from:
//! 1. Global: ~/.config/urview/config.toml (or $XDG_CONFIG_HOME/urview/config.toml)
//! 2. Per-project: .urview/config.toml (overrides global)
//!
//! Example config.toml:
//! ```toml
//! [normalize]
//! max_depth = 200
//!
//! [output]
//! format = "text"
//! ```

use crate::commands::render::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use urview_syntax::NormalizeOptions;

/// Normalizer settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Nesting limit for the program tree.
    pub max_depth: Option<usize>,
}

/// Output settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--format` is not given.
    pub format: Option<OutputFormat>,
}

/// Root configuration structure.
///
/// Every field is optional so a later file only overrides what it sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UrviewConfig {
    pub normalize: NormalizeConfig,
    pub output: OutputConfig,
}

impl UrviewConfig {
    /// Load the global config, then the project config under `root`.
    pub fn load(root: &Path) -> Self {
        Self::load_from(Self::global_config_path().as_deref(), root)
    }

    fn load_from(global: Option<&Path>, root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global) = global.and_then(Self::load_file) {
            config = config.merge(global);
        }

        let project_path = root.join(".urview").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("urview").join("config.toml"))
    }

    /// Load config from a file path. Missing files are skipped quietly,
    /// unparsable ones with a warning.
    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring invalid config");
                None
            }
        }
    }

    /// Fields set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            normalize: NormalizeConfig {
                max_depth: other.normalize.max_depth.or(self.normalize.max_depth),
            },
            output: OutputConfig {
                format: other.output.format.or(self.output.format),
            },
        }
    }

    /// Normalizer options with config values applied over the defaults.
    pub fn normalize_options(&self) -> NormalizeOptions {
        let mut options = NormalizeOptions::default();
        if let Some(max_depth) = self.normalize.max_depth {
            options.max_depth = max_depth;
        }
        options
    }
}
