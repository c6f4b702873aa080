//! Writing a project dump: collects the configuration files, mounted
//! paths and volume data selected by the backup options and stores them
//! through a [`DumpWriter`], followed by a manifest.

pub mod docker;
pub mod manifest;
pub mod writer;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::compose::model::VolumeDeclaration;
use crate::compose::{ComposeFile, Environment, Mount};
use crate::config::Config;
use crate::error::AppError;
use crate::options::{BackupOptions, Scope};
use crate::utils::{format_bytes, is_excluded};
use manifest::{MANIFEST_FILENAME, Manifest};
use writer::DumpWriter;

/// Everything `create_dump` needs: the normalized options plus the
/// loaded compose configuration and its provenance.
pub struct DumpContext {
    pub options: BackupOptions,
    pub config: ComposeFile,
    pub config_files: Vec<PathBuf>,
    pub environment: Environment,
    pub services: Vec<String>,
}

pub fn create_dump(ctx: &DumpContext) -> Result<(), AppError> {
    let app_config = Config::load()?;
    let exclude = app_config.compile_excludes()?;
    let mut writer = DumpWriter::create(&ctx.options)?;
    let mut manifest = Manifest::new(&ctx.options, &ctx.services);

    for scope in &ctx.options.scopes {
        match scope {
            Scope::Config => dump_config(ctx, &mut writer, exclude.as_ref(), &mut manifest)?,
            Scope::Mounted => dump_mounted(ctx, &mut writer, exclude.as_ref(), &mut manifest)?,
            Scope::Volumes => dump_volumes(ctx, &mut writer, exclude.as_ref(), &mut manifest)?,
        }
    }

    let encoded = serde_json::to_vec_pretty(&manifest)?;
    writer.store_bytes(Path::new(MANIFEST_FILENAME), &encoded)?;
    writer.finish()?;

    eprintln!(
        "Dumped {} across {} entr(ies).",
        format_bytes(manifest.total_size()),
        manifest.entries.len()
    );
    Ok(())
}

fn dump_config(
    ctx: &DumpContext,
    writer: &mut DumpWriter,
    exclude: Option<&GlobSet>,
    manifest: &mut Manifest,
) -> Result<(), AppError> {
    let options = &ctx.options;
    let avoid = target_path(options);
    let mut sources: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for file in &ctx.config_files {
        match project_relative(&options.project_dir, &file.to_string_lossy()) {
            Some((resolved, rel)) => {
                sources.insert(rel, resolved);
            }
            None => eprintln!(
                "Skipping compose file {}: outside the project directory",
                file.display()
            ),
        }
    }

    let env_file = options.project_dir.join(".env");
    if env_file.is_file() {
        sources.insert(PathBuf::from(".env"), env_file);
    }

    for name in &ctx.services {
        let Some(service) = ctx.config.services.get(name) else { continue };

        if let Some(env_files) = &service.env_file {
            for path in env_files.iter() {
                match project_relative(&options.project_dir, path) {
                    Some((resolved, rel)) if resolved.is_file() => {
                        sources.insert(rel, resolved);
                    }
                    _ => eprintln!(
                        "Skipping env_file '{path}' of service '{name}': \
                         outside the project directory or missing"
                    ),
                }
            }
        }

        if let Some(build) = &service.build
            && let Some(context) = build.context()
        {
            match project_relative(&options.project_dir, context) {
                Some((resolved, rel)) if resolved.is_dir() => {
                    collect_tree(
                        &mut sources,
                        &rel,
                        &resolved,
                        exclude,
                        avoid.as_deref(),
                        options.resolve_symlinks,
                        options.verbose,
                    );
                }
                _ => eprintln!(
                    "Skipping build context '{context}' of service '{name}': \
                     outside the project directory or missing"
                ),
            }
        }
    }

    for (rel, resolved) in sources {
        let dest = Path::new("config").join(&rel);
        let size = writer.store_file(&dest, &resolved)?;
        manifest.record(Scope::Config, &dest, size);
    }
    Ok(())
}

fn dump_mounted(
    ctx: &DumpContext,
    writer: &mut DumpWriter,
    exclude: Option<&GlobSet>,
    manifest: &mut Manifest,
) -> Result<(), AppError> {
    let options = &ctx.options;
    let avoid = target_path(options);
    let mut sources: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for name in &ctx.services {
        let Some(service) = ctx.config.services.get(name) else { continue };
        for volume in &service.volumes {
            let Some(Mount::Bind { source, .. }) = volume.mount() else { continue };
            match project_relative(&options.project_dir, &source) {
                Some((resolved, rel)) if resolved.is_dir() => {
                    collect_tree(
                        &mut sources,
                        &rel,
                        &resolved,
                        exclude,
                        avoid.as_deref(),
                        options.resolve_symlinks,
                        options.verbose,
                    );
                }
                Some((resolved, rel)) if resolved.is_file() => {
                    sources.insert(rel, resolved);
                }
                _ => eprintln!(
                    "Skipping mounted path '{source}' of service '{name}': \
                     outside the project directory or missing"
                ),
            }
        }
    }

    for (rel, resolved) in sources {
        let dest = Path::new("mounted").join(&rel);
        let size = writer.store_file(&dest, &resolved)?;
        manifest.record(Scope::Mounted, &dest, size);
    }
    Ok(())
}

fn dump_volumes(
    ctx: &DumpContext,
    writer: &mut DumpWriter,
    exclude: Option<&GlobSet>,
    manifest: &mut Manifest,
) -> Result<(), AppError> {
    let options = &ctx.options;

    let mut names: BTreeSet<String> = BTreeSet::new();
    for service_name in &ctx.services {
        let Some(service) = ctx.config.services.get(service_name) else { continue };
        for volume in &service.volumes {
            if let Some(Mount::Volume { name, .. }) = volume.mount() {
                names.insert(name);
            }
        }
    }
    if names.is_empty() {
        return Ok(());
    }

    if !docker::is_docker_available() {
        eprintln!("Docker CLI not available, skipping the volumes scope.");
        return Ok(());
    }

    let paused = if options.pause {
        docker::pause_project(&options.project_name, options.verbose)?
    } else {
        Vec::new()
    };
    let result = copy_volumes(ctx, writer, exclude, manifest, &names);
    let resumed = docker::unpause_containers(&paused, options.verbose);
    result?;
    resumed
}

fn copy_volumes(
    ctx: &DumpContext,
    writer: &mut DumpWriter,
    exclude: Option<&GlobSet>,
    manifest: &mut Manifest,
    names: &BTreeSet<String>,
) -> Result<(), AppError> {
    let options = &ctx.options;
    let avoid = target_path(options);
    for key in names {
        let declaration = ctx.config.volumes.get(key).and_then(|decl| decl.as_ref());
        let volume = volume_name(&options.project_name, key, declaration);
        let mountpoint = match docker::volume_mountpoint(&volume) {
            Ok(path) => path,
            Err(err) => {
                eprintln!("Skipping volume '{key}': {err}");
                continue;
            }
        };
        if !mountpoint.is_dir() {
            eprintln!(
                "Skipping volume '{key}': data directory {} is not accessible",
                mountpoint.display()
            );
            continue;
        }

        let mut sources: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        collect_tree(
            &mut sources,
            Path::new(key),
            &mountpoint,
            exclude,
            avoid.as_deref(),
            options.resolve_symlinks,
            options.verbose,
        );
        for (rel, resolved) in sources {
            let dest = Path::new("volumes").join(&rel);
            let size = writer.store_file(&dest, &resolved)?;
            manifest.record(Scope::Volumes, &dest, size);
        }
    }
    Ok(())
}

/// The on-disk name of a named volume: `<project>_<key>` for volumes the
/// project owns, the declared name for external ones.
fn volume_name(project: &str, key: &str, declaration: Option<&VolumeDeclaration>) -> String {
    if let Some(declaration) = declaration {
        if let Some(name) = &declaration.name {
            return name.clone();
        }
        if declaration.external.is_external() {
            return declaration.external.name().unwrap_or(key).to_string();
        }
    }
    format!("{project}_{key}")
}

/// Resolve a path referenced by the configuration and return it with its
/// project-relative form, or `None` when it escapes the project
/// directory or does not exist. `project_dir` must be canonical.
fn project_relative(project_dir: &Path, source: &str) -> Option<(PathBuf, PathBuf)> {
    let raw = Path::new(source);
    let candidate =
        if raw.is_absolute() { raw.to_path_buf() } else { project_dir.join(raw) };
    let resolved = fs::canonicalize(&candidate).ok()?;
    let rel = resolved.strip_prefix(project_dir).ok()?.to_path_buf();
    Some((resolved, rel))
}

/// Walk a directory and queue every file for storage, keyed by its
/// destination path so duplicates collapse.
fn collect_tree(
    sources: &mut BTreeMap<PathBuf, PathBuf>,
    rel_base: &Path,
    root: &Path,
    exclude: Option<&GlobSet>,
    avoid: Option<&Path>,
    follow_links: bool,
    verbose: bool,
) {
    let mut walker = WalkDir::new(root).follow_links(follow_links).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if verbose {
                    eprintln!("Skipping {:?}: {}", err.path(), err);
                }
                continue;
            }
        };

        let path = entry.path();
        if is_excluded(path, exclude) || avoid.is_some_and(|avoid| path.starts_with(avoid)) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_file() {
            if let Ok(rel) = path.strip_prefix(root) {
                sources.insert(rel_base.join(rel), path.to_path_buf());
            }
        } else if entry.file_type().is_symlink() && verbose {
            eprintln!("Skipping symlink {} (use --resolve-symlinks)", path.display());
        }
    }
}

/// Canonical path of the dump target itself, folder or archive file.
/// Tree walks skip it so a target inside the project directory is never
/// swept into its own dump.
fn target_path(options: &BackupOptions) -> Option<PathBuf> {
    let target = options.target.as_deref()?;
    if let Ok(resolved) = fs::canonicalize(target) {
        return Some(resolved);
    }
    // the archive file is created before collection starts, but if
    // canonicalizing it fails resolve the parent directory instead
    let parent = fs::canonicalize(target.parent()?).ok()?;
    Some(parent.join(target.file_name()?))
}
