//! Locating, parsing and validating a project's compose configuration.

pub mod env;
pub mod interpolate;
pub mod model;

pub use env::Environment;
pub use model::{ComposeFile, Mount, Service};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use interpolate::interpolate;

const DEFAULT_FILENAMES: [&str; 4] =
    ["compose.yaml", "compose.yml", "docker-compose.yaml", "docker-compose.yml"];

/// Resolve the compose files of a project. Explicit files are taken
/// relative to the project directory; otherwise the first well-known
/// file name wins, together with its `.override.` companion.
pub fn find_compose_files(
    project_dir: &Path,
    explicit: &[PathBuf],
) -> Result<Vec<PathBuf>, AppError> {
    if !explicit.is_empty() {
        let mut files = Vec::new();
        for file in explicit {
            let path = if file.is_absolute() { file.clone() } else { project_dir.join(file) };
            if !path.is_file() {
                return Err(AppError::config(format!(
                    "Compose file not found: {}",
                    path.display()
                )));
            }
            files.push(path);
        }
        return Ok(files);
    }

    for name in DEFAULT_FILENAMES {
        let path = project_dir.join(name);
        if !path.is_file() {
            continue;
        }
        let mut files = vec![path];
        if let Some(stem) = Path::new(name).file_stem()
            && let Some(extension) = Path::new(name).extension()
        {
            let override_path = project_dir.join(format!(
                "{}.override.{}",
                stem.to_string_lossy(),
                extension.to_string_lossy()
            ));
            if override_path.is_file() {
                files.push(override_path);
            }
        }
        return Ok(files);
    }

    Err(AppError::NoComposeFile(project_dir.to_path_buf()))
}

/// Parse and merge the given compose files, interpolating environment
/// variables first. Later files override earlier ones per top-level key.
pub fn load(files: &[PathBuf], environment: &Environment) -> Result<ComposeFile, AppError> {
    let mut merged: Option<ComposeFile> = None;
    for path in files {
        let raw = fs::read_to_string(path)?;
        let text = interpolate(&raw, environment);
        let file: ComposeFile = serde_yaml::from_str(&text)
            .map_err(|source| AppError::ComposeParse { path: path.clone(), source })?;
        merged = Some(match merged {
            None => file,
            Some(base) => merge(base, file),
        });
    }
    merged.ok_or_else(|| AppError::config("No compose files to load"))
}

fn merge(mut base: ComposeFile, overlay: ComposeFile) -> ComposeFile {
    if overlay.version.is_some() {
        base.version = overlay.version;
    }
    base.services.extend(overlay.services);
    base.volumes.extend(overlay.volumes);
    base
}

/// Validate the requested service names against the configuration. An
/// empty request selects every service.
pub fn select_services(
    config: &ComposeFile,
    requested: &[String],
) -> Result<Vec<String>, AppError> {
    let known: BTreeSet<&str> = config.services.keys().map(String::as_str).collect();
    let unknown: Vec<&str> =
        requested.iter().map(String::as_str).filter(|name| !known.contains(name)).collect();
    if !unknown.is_empty() {
        return Err(AppError::UnknownServices(unknown.join(", ")));
    }
    if requested.is_empty() {
        Ok(config.services.keys().cloned().collect())
    } else {
        Ok(requested.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn finds_default_file_and_override() {
        let dir = tempdir().unwrap();
        write(dir.path(), "docker-compose.yml", "services: {}\n");
        write(dir.path(), "docker-compose.override.yml", "services: {}\n");

        let files = find_compose_files(dir.path(), &[]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("docker-compose.yml"));
        assert!(files[1].ends_with("docker-compose.override.yml"));
    }

    #[test]
    fn modern_file_name_wins_over_legacy() {
        let dir = tempdir().unwrap();
        write(dir.path(), "compose.yaml", "services: {}\n");
        write(dir.path(), "docker-compose.yml", "services: {}\n");

        let files = find_compose_files(dir.path(), &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("compose.yaml"));
    }

    #[test]
    fn explicit_files_are_resolved_relative_to_project_dir() {
        let dir = tempdir().unwrap();
        write(dir.path(), "custom.yml", "services: {}\n");

        let files = find_compose_files(dir.path(), &[PathBuf::from("custom.yml")]).unwrap();
        assert_eq!(files, vec![dir.path().join("custom.yml")]);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = find_compose_files(dir.path(), &[PathBuf::from("nope.yml")]).unwrap_err();
        assert!(err.to_string().contains("Compose file not found"));
    }

    #[test]
    fn no_compose_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = find_compose_files(dir.path(), &[]).unwrap_err();
        assert!(err.to_string().contains("No compose file found"));
    }

    #[test]
    fn load_interpolates_variables() {
        let dir = tempdir().unwrap();
        let file = write(
            dir.path(),
            "docker-compose.yml",
            "services:\n  web:\n    image: demo:${COMPOSE_DUMP_T_TAG:-latest}\n",
        );
        let config = load(&[file], &Environment::default()).unwrap();
        assert_eq!(
            config.services.get("web").unwrap().image.as_deref(),
            Some("demo:latest")
        );
    }

    #[test]
    fn later_files_override_services() {
        let dir = tempdir().unwrap();
        let base = write(dir.path(), "base.yml", "services:\n  web:\n    image: a\n");
        let overlay =
            write(dir.path(), "override.yml", "services:\n  web:\n    image: b\n  db:\n    image: c\n");
        let config = load(&[base, overlay], &Environment::default()).unwrap();
        assert_eq!(config.services.get("web").unwrap().image.as_deref(), Some("b"));
        assert_eq!(config.services.len(), 2);
    }

    #[test]
    fn invalid_yaml_reports_the_file() {
        let dir = tempdir().unwrap();
        let file = write(dir.path(), "docker-compose.yml", "services: [not a map\n");
        let err = load(&[file], &Environment::default()).unwrap_err();
        assert!(err.to_string().contains("docker-compose.yml"));
    }

    #[test]
    fn unknown_services_are_rejected() {
        let config: ComposeFile =
            serde_yaml::from_str("services:\n  web:\n    image: a\n").unwrap();
        let err =
            select_services(&config, &["web".to_string(), "api".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown services: api");
    }

    #[test]
    fn empty_request_selects_all_services() {
        let config: ComposeFile =
            serde_yaml::from_str("services:\n  web:\n    image: a\n  db:\n    image: b\n")
                .unwrap();
        let selected = select_services(&config, &[]).unwrap();
        assert_eq!(selected, vec!["db".to_string(), "web".to_string()]);
    }
}
