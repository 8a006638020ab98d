//! `[env]` table of `<config dir>/<app>/config.toml`.
//!
//! The config dir is `$XDG_CONFIG_HOME` when set, else the platform default from `dirs`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir().ok_or(LoadError::NoConfigDir),
    }
}

/// Reads `<base>/<app_name>/config.toml`; a missing file is an empty map.
fn load_from(base: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.env)
}

pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    load_from(&config_home()?, app_name)
}
