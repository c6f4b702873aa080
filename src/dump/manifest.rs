use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::options::{BackupOptions, Scope};

pub const MANIFEST_FILENAME: &str = "Manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

/// Machine-readable description of a dump, stored as its last entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub tool_version: String,
    pub project: String,
    pub created: u64,
    pub scopes: Vec<String>,
    pub services: Vec<String>,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub scope: String,
    pub path: String,
    pub size: u64,
}

impl Manifest {
    pub fn new(options: &BackupOptions, services: &[String]) -> Self {
        Manifest {
            format_version: MANIFEST_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            project: options.project_name.clone(),
            created: unix_now(),
            scopes: options.scopes.iter().map(|scope| scope.as_str().to_string()).collect(),
            services: services.to_vec(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, scope: Scope, path: &Path, size: u64) {
        self.entries.push(ManifestEntry {
            scope: scope.as_str().to_string(),
            path: portable_path(path),
            size,
        });
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|entry| entry.size).sum()
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

/// Manifest paths always use forward slashes.
fn portable_path(path: &Path) -> String {
    let parts: Vec<String> =
        path.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TargetType;
    use std::path::PathBuf;

    fn options() -> BackupOptions {
        BackupOptions {
            compose_files: Vec::new(),
            project_dir: PathBuf::from("/srv/shop"),
            project_name: "shop".to_string(),
            scopes: vec![Scope::Config, Scope::Mounted],
            compression: None,
            target: None,
            target_type: TargetType::Archive,
            services: Vec::new(),
            pause: true,
            resolve_symlinks: false,
            verbose: false,
        }
    }

    #[test]
    fn records_entries_and_sums_sizes() {
        let mut manifest = Manifest::new(&options(), &["web".to_string()]);
        manifest.record(Scope::Config, Path::new("config/docker-compose.yml"), 120);
        manifest.record(Scope::Mounted, Path::new("mounted/data/a.txt"), 80);

        assert_eq!(manifest.total_size(), 200);
        assert_eq!(manifest.entries[0].scope, "config");
        assert_eq!(manifest.entries[1].path, "mounted/data/a.txt");
    }

    #[test]
    fn serializes_round_trippable_json() {
        let mut manifest = Manifest::new(&options(), &["web".to_string()]);
        manifest.record(Scope::Config, Path::new("Manifest.json"), 1);

        let encoded = serde_json::to_string_pretty(&manifest).unwrap();
        assert!(encoded.contains("\"project\": \"shop\""));
        let decoded: Manifest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.format_version, MANIFEST_VERSION);
        assert_eq!(decoded.scopes, vec!["config".to_string(), "mounted".to_string()]);
    }
}
