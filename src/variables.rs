use std::collections::HashMap;
use std::path::Path;

use crate::config::ConfigError;

/// named string constants that attribute syntax can reference by bare identifier,
/// eg: `{ project_name: PROJECT }` resolves `PROJECT` through this table.
#[derive(Debug, Default, Clone)]
pub struct Variables {
    consts: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// loads every `KEY=value` line of a .env file. blank lines and
    /// lines starting with `#` are skipped.
    pub fn from_dot_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::DotEnv {
            path: path.display().to_string(),
            source,
        })?;
        let out = Self::from_dot_env_str(&contents);
        tracing::debug!(path = %path.display(), count = out.consts.len(), "loaded .env variables");
        Ok(out)
    }

    pub fn from_dot_env_str(contents: &str) -> Self {
        let mut out = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, val)) = line.split_once('=') {
                out.set(key.trim(), val.trim());
            }
        }
        out
    }

    pub fn set(&mut self, key: &str, val: &str) {
        self.consts.insert(key.into(), val.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.consts.get(key).map(|s| s.as_str())
    }
}
