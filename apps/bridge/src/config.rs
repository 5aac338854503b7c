use std::{
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "bridge.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub remote_host: String,
    pub remote_port: u16,
    pub listen_port: u16,
    pub device_filter: String,
    pub quiet_window_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_host: "127.0.0.1".into(),
            remote_port: 6100,
            listen_port: 6111,
            device_filter: "ORAC-CTL".into(),
            quiet_window_ms: 200,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.remote_host.trim().is_empty() {
            bail!("remote_host must not be empty");
        }
        if self.device_filter.is_empty() {
            bail!("device_filter must not be empty");
        }
        if self.quiet_window_ms == 0 {
            bail!("quiet_window_ms must be greater than zero");
        }
        Ok(())
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.remote_host {
            self.remote_host = v;
        }
        if let Some(v) = file.remote_port {
            self.remote_port = v;
        }
        if let Some(v) = file.listen_port {
            self.listen_port = v;
        }
        if let Some(v) = file.device_filter {
            self.device_filter = v;
        }
        if let Some(v) = file.quiet_window_ms {
            self.quiet_window_ms = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    remote_host: Option<String>,
    remote_port: Option<u16>,
    listen_port: Option<u16>,
    device_filter: Option<String>,
    quiet_window_ms: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then `BRIDGE_*` environment variables.
/// An explicit `path` must exist; the default `bridge.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            settings.apply_file(file);
        }
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, env)?;
    Ok(settings)
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
    if let Some(v) = env("BRIDGE_REMOTE_HOST") {
        settings.remote_host = v;
    }
    if let Some(v) = env("BRIDGE_REMOTE_PORT") {
        settings.remote_port = parse_var("BRIDGE_REMOTE_PORT", &v)?;
    }
    if let Some(v) = env("BRIDGE_LISTEN_PORT") {
        settings.listen_port = parse_var("BRIDGE_LISTEN_PORT", &v)?;
    }
    if let Some(v) = env("BRIDGE_DEVICE") {
        settings.device_filter = v;
    }
    if let Some(v) = env("BRIDGE_QUIET_WINDOW_MS") {
        settings.quiet_window_ms = parse_var("BRIDGE_QUIET_WINDOW_MS", &v)?;
    }
    if let Some(v) = env("BRIDGE_LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|err| anyhow!("{key}={raw:?} is invalid: {err}"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
