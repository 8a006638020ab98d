//! Configuration for leadgen.
//!
//! [`load_and_apply`] merges the XDG `config.toml` `[env]` table and a project `.env` into
//! the process environment with priority **existing env > .env > XDG**. [`Settings`] then
//! reads the typed values the CLI needs from the environment.

mod dotenv;
mod settings;
mod xdg_toml;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

pub use settings::{
    Settings, SettingsError, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_STEPS, DEFAULT_MODEL,
    DEFAULT_SEARCH_MODEL,
};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no config directory for this platform")]
    NoConfigDir,
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` and `.env` (from `dotenv_dir`, or the
/// current directory), then sets every key that is not already in the environment.
pub fn load_and_apply(app_name: &str, dotenv_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg = xdg_toml::load_env_map(app_name)?;
    let dotenv = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;

    for (key, value) in merge(&xdg, &dotenv, |k| std::env::var_os(k).is_some()) {
        std::env::set_var(key, value);
    }
    Ok(())
}

/// Values to set: `.env` wins over XDG; keys for which `is_set` holds are skipped.
fn merge<'a>(
    xdg: &'a HashMap<String, String>,
    dotenv: &'a HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> Vec<(&'a str, &'a str)> {
    let keys: HashSet<&String> = xdg.keys().chain(dotenv.keys()).collect();
    let mut out: Vec<(&str, &str)> = keys
        .into_iter()
        .filter(|k| !is_set(k.as_str()))
        .filter_map(|k| {
            dotenv
                .get(k)
                .or_else(|| xdg.get(k))
                .map(|v| (k.as_str(), v.as_str()))
        })
        .collect();
    out.sort();
    out
}
