//! Load config from file and environment.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How decoded events are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// One `tracing` record per event.
    Log,
    /// One JSON object per line on stdout.
    Json,
}

impl std::str::FromStr for Output {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Output::Log),
            "json" => Ok(Output::Json),
            other => Err(format!("unknown output {other:?}")),
        }
    }
}

/// Daemon configuration. File: ~/.config/p2pmon/config.toml or /etc/p2pmon/config.toml.
/// Env overrides: P2PMON_INTERFACE, P2PMON_OUTPUT, P2PMON_LOG.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// P2P interface the callbacks belong to (default p2p0).
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Event output (default log).
    #[serde(default = "default_output")]
    pub output: Output,
    /// tracing env-filter directive (default info).
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_interface() -> String {
    "p2p0".to_string()
}
fn default_output() -> Output {
    Output::Log
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            output: default_output(),
            log_filter: default_log_filter(),
        }
    }
}

/// Load config: merge default, then config file (if present), then env vars.
/// A config file that exists but cannot be read or parsed is replaced by the defaults; the error
/// is handed back so the caller can report it once logging is up.
pub fn load() -> (Config, Option<anyhow::Error>) {
    let (c, err) = match load_file(&config_paths()) {
        Ok(c) => (c.unwrap_or_default(), None),
        Err(e) => (Config::default(), Some(e)),
    };
    (apply_env(c, |key| std::env::var(key).ok()), err)
}

fn apply_env(mut c: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(s) = var("P2PMON_INTERFACE").filter(|s| !s.is_empty()) {
        c.interface = s;
    }
    if let Some(s) = var("P2PMON_OUTPUT") {
        if let Ok(o) = s.parse::<Output>() {
            c.output = o;
        }
    }
    if let Some(s) = var("P2PMON_LOG").filter(|s| !s.is_empty()) {
        c.log_filter = s;
    }
    c
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/p2pmon/config.toml"));
    }
    out.push(PathBuf::from("/etc/p2pmon/config.toml"));
    out
}

/// The first existing file in `paths` wins; later paths are not consulted even if it is bad.
fn load_file(paths: &[PathBuf]) -> anyhow::Result<Option<Config>> {
    match paths.iter().find(|p| p.exists()) {
        Some(p) => read_file(p).map(Some),
        None => Ok(None),
    }
}

fn read_file(path: &Path) -> anyhow::Result<Config> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.interface, "p2p0");
        assert_eq!(c.output, Output::Log);
        assert_eq!(c.log_filter, "info");
    }

    #[test]
    fn file_fields_and_defaults() {
        let c: Config = toml::from_str("interface = \"p2p-wlan0-0\"\noutput = \"json\"\n").unwrap();
        assert_eq!(c.interface, "p2p-wlan0-0");
        assert_eq!(c.output, Output::Json);
        assert_eq!(c.log_filter, "info");
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("proxy_port = 3128\n").is_err());
        assert!(toml::from_str::<Config>("output = \"xml\"\n").is_err());
    }

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("p2pmon-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn bad_config_file_reported() {
        let path = temp_config("bad.toml", "output = \"xml\"\n");
        let err = load_file(&[path.clone()]).unwrap_err();
        assert!(format!("{err:#}").contains(&path.display().to_string()));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn first_existing_file_wins() {
        let missing = std::env::temp_dir().join("p2pmon-no-such-dir/config.toml");
        let good = temp_config("good.toml", "interface = \"p2p7\"\n");
        assert!(load_file(&[missing.clone()]).unwrap().is_none());
        let c = load_file(&[missing, good.clone()]).unwrap().unwrap();
        assert_eq!(c.interface, "p2p7");
        std::fs::remove_file(&good).unwrap();
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("P2PMON_INTERFACE", "p2p1"),
            ("P2PMON_OUTPUT", "json"),
            ("P2PMON_LOG", "p2pmon_core=debug"),
        ]
        .into_iter()
        .collect();
        let c = apply_env(Config::default(), |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(c.interface, "p2p1");
        assert_eq!(c.output, Output::Json);
        assert_eq!(c.log_filter, "p2pmon_core=debug");
    }

    #[test]
    fn bad_env_values_ignored() {
        let c = apply_env(Config::default(), |k| match k {
            "P2PMON_OUTPUT" => Some("xml".into()),
            "P2PMON_INTERFACE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(c.output, Output::Log);
        assert_eq!(c.interface, "p2p0");
    }
}
