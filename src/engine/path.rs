//! Target path expansion
//!
//! Supports a leading `~`, a leading `HOME` component (the placeholder older
//! templates were written with), `$VAR`, `${VAR}` and Windows-style `%VAR%`.
//! Variables that are not set are left as written.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))|%([A-Za-z_][A-Za-z0-9_]*)%",
        )
        .expect("environment variable pattern is valid")
    })
}

/// Expand a path using the current user's home and environment
pub fn expand_path(raw: &str) -> PathBuf {
    expand_path_with(raw, dirs::home_dir().as_deref(), |name| {
        std::env::var(name).ok()
    })
}

/// Expand a path against an explicit home directory and variable lookup
pub fn expand_path_with<F>(raw: &str, home: Option<&Path>, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = env_var_pattern().replace_all(raw, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        lookup(name).unwrap_or_else(|| caps[0].to_string())
    });

    let Some(home) = home else {
        return PathBuf::from(expanded.as_ref());
    };
    for prefix in ["~", "HOME"] {
        if let Some(rest) = strip_component(&expanded, prefix) {
            return home.join(rest);
        }
    }
    PathBuf::from(expanded.as_ref())
}

/// `rest` if `path` is `prefix` alone or `prefix` followed by a separator
fn strip_component<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/').or_else(|| rest.strip_prefix('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(raw: &str) -> PathBuf {
        expand_path_with(raw, Some(Path::new("/home/me")), |name| match name {
            "XDG_CONFIG_HOME" => Some("/home/me/.config".to_string()),
            "APP" => Some("kitty".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_tilde() {
        assert_eq!(expand("~/.config/x"), PathBuf::from("/home/me/.config/x"));
        assert_eq!(expand("~"), PathBuf::from("/home/me"));
        assert_eq!(expand("~other/x"), PathBuf::from("~other/x"));
    }

    #[test]
    fn test_home_placeholder() {
        assert_eq!(expand("HOME/.Xresources"), PathBuf::from("/home/me/.Xresources"));
        assert_eq!(expand("HOMEWORK/notes"), PathBuf::from("HOMEWORK/notes"));
    }

    #[test]
    fn test_env_vars() {
        assert_eq!(
            expand("$XDG_CONFIG_HOME/${APP}/theme.conf"),
            PathBuf::from("/home/me/.config/kitty/theme.conf")
        );
    }

    #[test]
    fn test_windows_style_vars() {
        assert_eq!(
            expand("%XDG_CONFIG_HOME%/%APP%/theme.conf"),
            PathBuf::from("/home/me/.config/kitty/theme.conf")
        );
        assert_eq!(expand("100%/x"), PathBuf::from("100%/x"));
    }

    #[test]
    fn test_unknown_var_left_as_written() {
        assert_eq!(expand("$NOPE/x"), PathBuf::from("$NOPE/x"));
        assert_eq!(expand("${NOPE}/x"), PathBuf::from("${NOPE}/x"));
        assert_eq!(expand("%NOPE%/x"), PathBuf::from("%NOPE%/x"));
    }

    #[test]
    fn test_plain_path_untouched() {
        assert_eq!(expand("app.conf"), PathBuf::from("app.conf"));
        assert_eq!(expand("/etc/app.conf"), PathBuf::from("/etc/app.conf"));
    }
}
