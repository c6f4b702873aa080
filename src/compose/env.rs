use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::AppError;

/// Variables available for compose file interpolation. The process
/// environment always takes precedence over values read from `.env`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    file_values: BTreeMap<String, String>,
}

impl Environment {
    /// Read the `.env` file of a project directory, if there is one.
    pub fn from_env_file(project_dir: &Path) -> Result<Self, AppError> {
        let path = project_dir.join(".env");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Self { file_values: parse(&contents) })
    }

    pub fn from_values(values: BTreeMap<String, String>) -> Self {
        Self { file_values: values }
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| self.file_values.get(key).cloned())
    }
}

fn parse(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
    }
    values
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
