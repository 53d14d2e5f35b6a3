//! Platform directory resolution.
//!
//! Directories come from the `dirs` crate, so they follow each platform's
//! conventions (`~/.config` and `~/.local/share` on Linux,
//! `~/Library/Application Support` on macOS, `%APPDATA%` on Windows).

use std::path::PathBuf;

/// Name of the per-application subdirectory.
const APP_DIR: &str = "keygrid";

/// Name of the configuration file inside [`config_dir`].
const CONFIG_FILE: &str = "config.toml";

/// Returns the configuration directory, e.g. `~/.config/keygrid`.
///
/// `None` when the platform reports no configuration directory.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Returns the data directory used for trace files, e.g. `~/.local/share/keygrid`.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR))
}

/// Returns the default configuration file path.
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and every path when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use keygrid::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/etc/keygrid.toml"), PathBuf::from("/etc/keygrid.toml"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_only_touches_leading_tilde() {
        assert_eq!(expand_tilde("relative/~/x"), PathBuf::from("relative/~/x"));
        assert_eq!(expand_tilde("/abs"), PathBuf::from("/abs"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/keygrid.toml"), home.join("keygrid.toml"));
        }
    }

    #[test]
    fn default_config_file_lives_in_config_dir() {
        if let (Some(dir), Some(file)) = (config_dir(), default_config_file()) {
            assert_eq!(file.parent(), Some(dir.as_path()));
            assert!(file.ends_with("keygrid/config.toml"));
        }
    }
}
