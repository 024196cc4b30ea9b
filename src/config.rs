use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "AUD_CONFIG";
/// Config file name looked up locally and in the platform config dir
pub const CONFIG_FILE: &str = "aud.json";
/// Default log file name for `--log` without a path
pub const LOG_FILE: &str = "aud.log";
const APP_DIR: &str = "aud";

/// Writer settings: header comment and output path handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Tool name in the `"Written by ..."` header comment
    pub tool_name: String,
    pub tool_version: String,
    /// Replace the output path's extension with `.usda` on save
    pub force_extension: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            tool_name: "AUD".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            force_extension: true,
        }
    }
}

impl WriterConfig {
    pub fn header_comment(&self) -> String {
        format!("Written by {} v{}", self.tool_name, self.tool_version)
    }

    /// Read a JSON config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Find and load the active config, or fall back to defaults.
    ///
    /// An explicitly named file (CLI or env) must exist.
    pub fn discover(cli_path: Option<PathBuf>) -> Result<Self> {
        match config_path(cli_path) {
            Some(path) => {
                info!("Config: {}", path.display());
                Self::load(&path)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate the config file.
///
/// Priority:
/// 1. CLI --config argument
/// 2. AUD_CONFIG environment variable
/// 3. `aud.json` in the current directory, if present
/// 4. Platform config directory from dirs-next, if present
///
/// Platform paths:
/// - Linux: ~/.config/aud/aud.json
/// - macOS: ~/Library/Application Support/aud/aud.json
/// - Windows: %APPDATA%\aud\aud.json
pub fn config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    let explicit = cli_path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let local = std::env::current_dir().ok().map(|d| d.join(CONFIG_FILE));
    let platform = dirs_next::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE));
    pick_config(explicit, [local, platform])
}

fn pick_config(
    explicit: Option<PathBuf>,
    candidates: impl IntoIterator<Item = Option<PathBuf>>,
) -> Option<PathBuf> {
    explicit.or_else(|| candidates.into_iter().flatten().find(|p| p.exists()))
}

/// Get path to a data file (logs)
///
/// Local folder if it holds `aud.json`, else the platform data directory,
/// else ".".
pub fn data_file(name: &str) -> PathBuf {
    if let Ok(current_dir) = std::env::current_dir() {
        if current_dir.join(CONFIG_FILE).exists() {
            return current_dir.join(name);
        }
    }

    if let Some(dir) = dirs_next::data_dir() {
        let dir = dir.join(APP_DIR);
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join(name);
        }
    }

    PathBuf::from(".").join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = WriterConfig::default();
        assert!(config.force_extension);
        assert_eq!(
            config.header_comment(),
            format!("Written by AUD v{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aud.json");
        fs::write(&path, r#"{"tool_name": "Exporter", "tool_version": "2.1"}"#).unwrap();

        let config = WriterConfig::load(&path).unwrap();
        assert_eq!(config.header_comment(), "Written by Exporter v2.1");
        assert!(config.force_extension);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = WriterConfig::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(WriterConfig::load(&bad).is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("aud.json");
        fs::write(&local, "{}").unwrap();

        let explicit = PathBuf::from("/custom/aud.json");
        let picked = pick_config(Some(explicit.clone()), [Some(local)]);
        assert_eq!(picked, Some(explicit));
    }

    #[test]
    fn test_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let present = dir.path().join("aud.json");
        fs::write(&present, "{}").unwrap();

        let picked = pick_config(None, [Some(missing.clone()), None, Some(present.clone())]);
        assert_eq!(picked, Some(present));
        assert_eq!(pick_config(None, [Some(missing)]), None);
    }

    #[test]
    fn test_discover_with_cli_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"force_extension": false}"#).unwrap();

        let config = WriterConfig::discover(Some(path)).unwrap();
        assert!(!config.force_extension);
        assert_eq!(config.tool_name, "AUD");
    }
}
