use std::{fs, io::ErrorKind, path::Path};

use serde::Deserialize;

use crate::{error::PaginationError, keys::KeyRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationOptions {
    pub action_name: String,
    pub page_key: String,
    pub per_page_key: String,
    pub filters: Vec<String>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            action_name: "fetchList".into(),
            page_key: "page".into(),
            per_page_key: "per_page".into(),
            filters: Vec::new(),
        }
    }
}

impl PaginationOptions {
    pub fn registry(&self) -> KeyRegistry {
        KeyRegistry::new(&self.page_key, &self.per_page_key, &self.filters)
    }
}

/// Reads options from `path` (a missing file means defaults), then applies
/// `APP__*` environment overrides.
pub fn load_options(path: &Path) -> Result<PaginationOptions, PaginationError> {
    load_options_with_env(path, |name| std::env::var(name).ok())
}

pub fn load_options_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PaginationOptions, PaginationError> {
    let config_error = |message: String| PaginationError::Config {
        path: path.display().to_string(),
        message,
    };

    let mut options = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<PaginationOptions>(&raw)
            .map_err(|err| config_error(err.to_string()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => PaginationOptions::default(),
        Err(err) => return Err(config_error(err.to_string())),
    };

    apply_env_overrides(&mut options, env);
    Ok(options)
}

fn apply_env_overrides(options: &mut PaginationOptions, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("APP__ACTION_NAME") {
        options.action_name = v;
    }
    if let Some(v) = env("APP__PAGE_KEY") {
        options.page_key = v;
    }
    if let Some(v) = env("APP__PER_PAGE_KEY") {
        options.per_page_key = v;
    }
    if let Some(v) = env("APP__FILTERS") {
        options.filters = v
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
