//! Batch configuration
//!
//! ```toml
//! template_dir = "~/.config/prisma/templates"
//! strict = false
//!
//! [[templates]]
//! path = "alacritty.prisma"
//! output = "~/.config/alacritty/colors.toml"
//!
//! [[templates]]
//! path = "kitty.prisma"        # no output: the template's @target is used
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::expand_path;
use crate::parser::ParseMode;
use crate::ApplyOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One configured template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateEntry {
    /// Template file, relative to the template directory unless absolute
    pub path: String,
    /// Output override; empty or missing means use `@target`
    #[serde(default)]
    pub output: Option<String>,
}

/// Templates to apply, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub template_dir: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,
    /// Directory the config was loaded from, for relative paths
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// `<config dir>/prisma/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prisma").join("config.toml"))
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }

    /// `base` with strict parsing switched on if either side asks for it
    pub fn apply_options(&self, base: &ApplyOptions) -> ApplyOptions {
        match self.parse_mode() {
            ParseMode::Strict => base.clone().with_parse_mode(ParseMode::Strict),
            ParseMode::Lenient => base.clone(),
        }
    }

    /// Directory holding template files
    ///
    /// Defaults to `templates/` next to the config file.
    pub fn template_dir(&self) -> PathBuf {
        let base = self.base_dir.clone().unwrap_or_default();
        match &self.template_dir {
            Some(dir) => base.join(expand_path(dir)),
            None => base.join("templates"),
        }
    }

    /// Full path of a configured template
    pub fn template_path(&self, entry: &TemplateEntry) -> PathBuf {
        self.template_dir().join(expand_path(&entry.path))
    }
}

impl TemplateEntry {
    /// Output override, with empty strings treated as absent
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(expand_path)
    }
}
