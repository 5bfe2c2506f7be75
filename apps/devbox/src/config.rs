use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use hosts::HostsFile;
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "devbox.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Explicit hosts file; the platform default is used when unset.
    pub hosts_path: Option<PathBuf>,
    pub notification_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts_path: None,
            notification_ms: 2000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    hosts_path: Option<PathBuf>,
    notification_ms: Option<u64>,
}

impl Settings {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn hosts_file(&self) -> anyhow::Result<HostsFile> {
        match &self.hosts_path {
            Some(path) => Ok(HostsFile::new(path)),
            None => HostsFile::system().context("no hosts file configured for this platform"),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then `config_path` if it exists, then environment overrides.
pub fn load_settings_from(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.hosts_path {
                    settings.hosts_path = Some(v);
                }
                if let Some(v) = file_cfg.notification_ms {
                    settings.notification_ms = v;
                }
            }
            Err(error) => {
                warn!(path = %config_path.display(), %error, "ignoring unreadable config file");
            }
        }
    }

    for key in ["DEVBOX_HOSTS_PATH", "APP__HOSTS_PATH"] {
        if let Some(v) = env(key).filter(|v| !v.trim().is_empty()) {
            settings.hosts_path = Some(PathBuf::from(v));
        }
    }

    for key in ["DEVBOX_NOTIFICATION_MS", "APP__NOTIFICATION_MS"] {
        if let Some(v) = env(key) {
            match v.trim().parse::<u64>() {
                Ok(parsed) => settings.notification_ms = parsed,
                Err(_) => warn!(key, value = %v, "ignoring non-numeric notification delay"),
            }
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
