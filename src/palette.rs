//! Color palettes fed into templates
//!
//! A palette is a flat map from color name (`background`, `color0`, ...) to a
//! hex string. The upstream color generator hands it over either as pywal's
//! `colors.json`, as a flat JSON object, or as a TOML file with a `[colors]`
//! table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading palettes
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("failed to read palette file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse palette TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse palette JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named set of colors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    /// Optional name, taken from TOML metadata
    pub name: Option<String>,
    /// Color name -> hex value
    pub colors: BTreeMap<String, String>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

/// JSON layouts accepted for palettes
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPalette {
    /// pywal cache format: `special` (background, foreground, cursor) plus
    /// `colors` (color0..color15)
    Wal {
        #[serde(default)]
        special: BTreeMap<String, String>,
        colors: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a palette file, choosing the format by extension
    ///
    /// `.json` files are read as pywal/flat JSON, everything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path).map_err(|source| PaletteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load palette from a TOML string with a `[colors]` table
    pub fn from_toml_str(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;
        Ok(Palette {
            name: parsed.metadata.and_then(|m| m.name),
            colors: parsed.colors,
        })
    }

    /// Load palette from JSON
    ///
    /// For pywal output the `special` colors are merged over `colors`.
    pub fn from_json_str(content: &str) -> Result<Self, PaletteError> {
        let colors = match serde_json::from_str::<JsonPalette>(content)? {
            JsonPalette::Wal {
                special,
                mut colors,
            } => {
                colors.extend(special);
                colors
            }
            JsonPalette::Flat(colors) => colors,
        };
        Ok(Palette { name: None, colors })
    }

    /// Where pywal caches the palette of the current wallpaper
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cache").join("wal").join("colors.json"))
    }

    /// Look up a color by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Palette {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Palette {
            name: None,
            colors: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_iter_and_get() {
        let palette: Palette = [("background", "#000000"), ("color0", "#1a1b26")]
            .into_iter()
            .collect();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get("color0"), Some("#1a1b26"));
        assert_eq!(palette.get("color1"), None);
    }

    #[test]
    fn test_parse_wal_json_merges_special() {
        let json = r##"{
            "wallpaper": "/home/me/wall.png",
            "alpha": "100",
            "special": {
                "background": "#0b0c10",
                "foreground": "#c5c6c7",
                "cursor": "#c5c6c7"
            },
            "colors": {
                "color0": "#0b0c10",
                "color1": "#45a29e"
            }
        }"##;
        let palette = Palette::from_json_str(json).expect("Should parse");
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.get("background"), Some("#0b0c10"));
        assert_eq!(palette.get("color1"), Some("#45a29e"));
        assert_eq!(palette.get("wallpaper"), None);
    }

    #[test]
    fn test_parse_flat_json() {
        let json = r##"{"background": "#000000", "accent": "#ff8800"}"##;
        let palette = Palette::from_json_str(json).expect("Should parse");
        assert_eq!(palette.get("accent"), Some("#ff8800"));
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let toml_str = r##"
[metadata]
name = "Night"

[colors]
background = "#000000"
color0 = "#1a1b26"
"##;
        let palette = Palette::from_toml_str(toml_str).expect("Should parse");
        assert_eq!(palette.name, Some("Night".to_string()));
        assert_eq!(palette.get("color0"), Some("#1a1b26"));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Palette::from_toml_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(PaletteError::Toml(_))));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("colors.json");
        std::fs::write(&json_path, r##"{"color0": "#111111"}"##).unwrap();
        let toml_path = dir.path().join("palette.toml");
        std::fs::write(&toml_path, "[colors]\ncolor0 = \"#222222\"\n").unwrap();

        let json = Palette::from_file(&json_path).expect("Should load json");
        let toml = Palette::from_file(&toml_path).expect("Should load toml");
        assert_eq!(json.get("color0"), Some("#111111"));
        assert_eq!(toml.get("color0"), Some("#222222"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Palette::from_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(PaletteError::Io { .. })));
    }
}
