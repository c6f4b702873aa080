use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::AppError;
use crate::utils::ensure_directory;

/// Data categories a dump can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    Config,
    Mounted,
    Volumes,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Config, Scope::Mounted, Scope::Volumes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Config => "config",
            Scope::Mounted => "mounted",
            Scope::Volumes => "volumes",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compression applied to an archive dump. `Tar` is a plain,
/// uncompressed tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Bz2,
    Gz,
    Tar,
    Xz,
}

impl Compression {
    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "bz2" => Some(Compression::Bz2),
            "gz" => Some(Compression::Gz),
            "tar" => Some(Compression::Tar),
            "xz" => Some(Compression::Xz),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Bz2 => "bz2",
            Compression::Gz => "gz",
            Compression::Tar => "tar",
            Compression::Xz => "xz",
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Compression::from_name(s)
            .ok_or_else(|| format!("Unknown compression '{s}', expected one of bz2, gz, tar, xz"))
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Archive,
    Folder,
}

/// Raw `backup` flags as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct BackupRequest {
    pub compose_files: Vec<PathBuf>,
    pub project_dir: PathBuf,
    pub project_name: Option<String>,
    pub config: bool,
    pub mounted: bool,
    pub volumes: bool,
    pub compression: Option<Compression>,
    pub target: Option<PathBuf>,
    pub no_pause: bool,
    pub resolve_symlinks: bool,
    pub verbose: bool,
    pub services: Vec<String>,
}

/// Canonical backup options after normalization.
///
/// Invariants: `scopes` is never empty; a `Folder` target type implies an
/// existing target directory and no compression; a missing target implies
/// an archive streamed to stdout.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub compose_files: Vec<PathBuf>,
    pub project_dir: PathBuf,
    pub project_name: String,
    pub scopes: Vec<Scope>,
    pub compression: Option<Compression>,
    pub target: Option<PathBuf>,
    pub target_type: TargetType,
    pub services: Vec<String>,
    pub pause: bool,
    pub resolve_symlinks: bool,
    pub verbose: bool,
}

impl BackupOptions {
    pub fn from_request(request: BackupRequest) -> Result<Self, AppError> {
        ensure_directory(&request.project_dir)?;
        let project_dir = fs::canonicalize(&request.project_dir)?;

        let project_name = request
            .project_name
            .filter(|name| !name.is_empty())
            .or_else(|| std::env::var("COMPOSE_PROJECT_NAME").ok().filter(|name| !name.is_empty()))
            .or_else(|| project_dir.file_name().map(|name| name.to_string_lossy().into_owned()))
            .ok_or_else(|| AppError::config("Unable to derive a project name, use --project-name"))?;

        let mut scopes = Vec::new();
        if request.config {
            scopes.push(Scope::Config);
        }
        if request.mounted {
            scopes.push(Scope::Mounted);
        }
        if request.volumes {
            scopes.push(Scope::Volumes);
        }
        if scopes.is_empty() {
            scopes = Scope::ALL.to_vec();
        }

        let mut compression = request.compression;
        if let Some(target) = &request.target {
            if compression.is_none()
                && let Some(extension) = target.extension()
            {
                compression = Compression::from_name(&extension.to_string_lossy());
            }
        } else if compression.is_none() {
            compression = Some(Compression::Tar);
        }

        let target_type = if compression.is_some() {
            TargetType::Archive
        } else if let Some(target) = &request.target {
            ensure_directory(target)?;
            TargetType::Folder
        } else {
            // unreachable: targetless dumps always default to a tar stream
            TargetType::Archive
        };

        Ok(BackupOptions {
            compose_files: request.compose_files,
            project_dir,
            project_name,
            scopes,
            compression,
            target: request.target,
            target_type,
            services: request.services,
            pause: !request.no_pause,
            resolve_symlinks: request.resolve_symlinks,
            verbose: request.verbose,
        })
    }
}
