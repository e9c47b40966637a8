//! Daemon configuration (`config.json`, see [`config_path`]).

use nback::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ADDR_ENV: &str = "NBACKD_ADDR";
pub const CONFIG_ENV: &str = "NBACKD_CONFIG";

fn default_listen_addr() -> String {
    "127.0.0.1:9877".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("could not determine the OS config directory; set {CONFIG_ENV}")]
    NoConfigDir,

    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Session started at launch and used until a client reconfigures.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            session: SessionConfig::default(),
        }
    }
}

/// Where the daemon looks for `config.json`.
///
/// `NBACKD_CONFIG` wins; otherwise the per-user config dir
/// (`~/.config/nback/config.json` on Linux, `%APPDATA%\\nback\\config.json`
/// on Windows, `~/Library/Application Support/nback/config.json` on macOS).
pub fn config_path() -> Result<PathBuf, ConfigLoadError> {
    resolve_config_path(std::env::var_os(CONFIG_ENV).map(PathBuf::from), dirs::config_dir())
}

fn resolve_config_path(
    explicit: Option<PathBuf>,
    os_config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigLoadError> {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    os_config_dir
        .map(|dir| dir.join("nback").join("config.json"))
        .ok_or(ConfigLoadError::NoConfigDir)
}

impl DaemonConfig {
    /// `Ok(None)` if the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigLoadError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read the config file, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(cfg)) => {
                info!("Loaded config from {:?}", path);
                cfg
            }
            Ok(None) => {
                info!("No config at {:?}; using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_addr_override(std::env::var(ADDR_ENV).ok())
    }

    fn with_addr_override(mut self, addr: Option<String>) -> Self {
        if let Some(addr) = addr.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
            info!("{} overrides listen address: {}", ADDR_ENV, addr);
            self.listen_addr = addr;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback::Modality;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nbackd-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: DaemonConfig =
            serde_json::from_str(r#"{ "session": { "n": 3, "modalities": ["audio", "color"] } }"#)
                .unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9877");
        assert_eq!(cfg.session.n, 3);
        assert_eq!(cfg.session.grid_size, 3);
        assert_eq!(
            cfg.session.modalities.iter().collect::<Vec<_>>(),
            vec![Modality::Color, Modality::Audio]
        );
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = temp_path("missing");
        assert!(matches!(DaemonConfig::read(&path), Ok(None)));
        assert_eq!(DaemonConfig::load(&path), DaemonConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            DaemonConfig::read(&path),
            Err(ConfigLoadError::Parse { .. })
        ));
        assert_eq!(DaemonConfig::load(&path), DaemonConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_path_prefers_explicit_location() {
        let explicit = PathBuf::from("/etc/nback.json");
        let os_dir = PathBuf::from("/home/u/.config");

        let got = resolve_config_path(Some(explicit.clone()), Some(os_dir.clone())).unwrap();
        assert_eq!(got, explicit);

        let got = resolve_config_path(Some(PathBuf::new()), Some(os_dir.clone())).unwrap();
        assert_eq!(got, os_dir.join("nback").join("config.json"));

        assert!(matches!(
            resolve_config_path(None, None),
            Err(ConfigLoadError::NoConfigDir)
        ));
    }

    #[test]
    fn blank_addr_override_is_ignored() {
        let cfg = DaemonConfig::default().with_addr_override(Some("  ".to_string()));
        assert_eq!(cfg.listen_addr, "127.0.0.1:9877");

        let cfg = DaemonConfig::default().with_addr_override(Some("0.0.0.0:1234".to_string()));
        assert_eq!(cfg.listen_addr, "0.0.0.0:1234");
    }
}
