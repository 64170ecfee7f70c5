use std::path::{Path, PathBuf};
use std::time::Duration;

use ghostnote_core::HasherParams;
use serde::{Deserialize, Serialize};

use crate::constants::CONFIG_ENV;

/// Daemon configuration. Every section is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostnoteConfig {
    pub server: ServerSection,
    pub hasher: HasherParams,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub socket_path: Option<String>,
    pub sweep_interval_seconds: u64,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            socket_path: None,
            sweep_interval_seconds: 300,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl GhostnoteConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.server.sweep_interval_seconds)
    }

    fn validate(&self, path: &Path) -> anyhow::Result<()> {
        if self.server.sweep_interval_seconds == 0 {
            return Err(anyhow::anyhow!(
                "Invalid config {}: sweep_interval_seconds must be greater than 0",
                path.display()
            ));
        }
        if self.hasher.iterations == 0 || self.hasher.parallelism == 0 {
            return Err(anyhow::anyhow!(
                "Invalid config {}: hasher iterations and parallelism must be greater than 0",
                path.display()
            ));
        }
        Ok(())
    }
}

/// Load the config named on the command line, by `GHOSTNOTE_CONFIG`, or at
/// the XDG default. A missing default file yields the built-in defaults; a
/// missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<GhostnoteConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match std::env::var(CONFIG_ENV) {
            Ok(value) if !value.trim().is_empty() => (PathBuf::from(value), true),
            _ => (default_config_path()?, false),
        },
    };

    if !path.exists() {
        if required {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }
        return Ok(GhostnoteConfig::default());
    }
    read_config(&path)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<GhostnoteConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: GhostnoteConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config.validate(path)?;
    Ok(config)
}

/// Pick the socket path: command line (or `GHOSTNOTE_SOCKET`, which clap
/// folds into the flag), then config, then the per-user default.
pub fn resolve_socket_path(
    flag: Option<&Path>,
    config: &GhostnoteConfig,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = config.server.socket_path.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    default_socket_path()
}

pub fn default_socket_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_RUNTIME_DIR") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("ghostnote").join("ghostnote.sock"));
        }
    }
    let uid = unsafe { libc::geteuid() };
    Ok(PathBuf::from(format!("/tmp/ghostnote-{}", uid)).join("ghostnote.sock"))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("ghostnote"));
        }
    }
    Ok(home_dir()?.join(".config").join("ghostnote"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> GhostnoteConfig {
        toml::from_str(contents).unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.server.sweep_interval_seconds, 300);
        assert_eq!(config.server.log_level, "info");
        assert!(config.server.socket_path.is_none());
        assert_eq!(config.hasher, HasherParams::default());
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
[server]
sweep_interval_seconds = 10

[hasher]
memory_kib = 512
"#,
        );
        assert_eq!(config.server.sweep_interval_seconds, 10);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.hasher.memory_kib, 512);
        assert_eq!(config.hasher.iterations, HasherParams::default().iterations);
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let config = parse("[server]\nsweep_interval_seconds = 0\n");
        assert!(config.validate(Path::new("config.toml")).is_err());
    }

    #[test]
    fn test_socket_flag_wins() {
        let mut config = GhostnoteConfig::default();
        config.server.socket_path = Some("/from/config.sock".to_string());

        let flag = PathBuf::from("/from/flag.sock");
        assert_eq!(
            resolve_socket_path(Some(&flag), &config).unwrap(),
            flag
        );
        assert_eq!(
            resolve_socket_path(None, &config).unwrap(),
            PathBuf::from("/from/config.sock")
        );
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let path = std::env::temp_dir().join("ghostnote-does-not-exist.toml");
        assert!(load_config(Some(&path)).is_err());
    }
}
