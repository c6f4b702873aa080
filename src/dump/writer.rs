use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use tar::Builder;
use xz2::write::XzEncoder;

use crate::error::AppError;
use crate::options::{BackupOptions, Compression, TargetType};

type Sink = Box<dyn Write>;

/// Destination of a dump: a tar archive (plain or compressed, written
/// to a file or to stdout) or a plain directory tree.
pub enum DumpWriter {
    Tar(Builder<Sink>),
    Gz(Builder<GzEncoder<Sink>>),
    Bz2(Builder<BzEncoder<Sink>>),
    Xz(Builder<XzEncoder<Sink>>),
    Folder(PathBuf),
}

impl DumpWriter {
    pub fn create(options: &BackupOptions) -> Result<Self, AppError> {
        if options.target_type == TargetType::Folder {
            let root = options
                .target
                .clone()
                .ok_or_else(|| AppError::config("A folder dump requires a target directory"))?;
            return Ok(DumpWriter::Folder(root));
        }

        let sink: Sink = match &options.target {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };
        let writer = match options.compression.unwrap_or(Compression::Tar) {
            Compression::Tar => DumpWriter::Tar(Builder::new(sink)),
            Compression::Gz => {
                DumpWriter::Gz(Builder::new(GzEncoder::new(sink, flate2::Compression::default())))
            }
            Compression::Bz2 => {
                DumpWriter::Bz2(Builder::new(BzEncoder::new(sink, bzip2::Compression::default())))
            }
            Compression::Xz => DumpWriter::Xz(Builder::new(XzEncoder::new(sink, 6))),
        };
        Ok(writer)
    }

    /// Store a file under `dest` and report its size in bytes.
    pub fn store_file(&mut self, dest: &Path, source: &Path) -> Result<u64, AppError> {
        match self {
            DumpWriter::Tar(builder) => append_file(builder, dest, source),
            DumpWriter::Gz(builder) => append_file(builder, dest, source),
            DumpWriter::Bz2(builder) => append_file(builder, dest, source),
            DumpWriter::Xz(builder) => append_file(builder, dest, source),
            DumpWriter::Folder(root) => {
                let path = root.join(dest);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                Ok(fs::copy(source, &path)?)
            }
        }
    }

    /// Store in-memory contents under `dest`.
    pub fn store_bytes(&mut self, dest: &Path, contents: &[u8]) -> Result<(), AppError> {
        match self {
            DumpWriter::Tar(builder) => append_bytes(builder, dest, contents),
            DumpWriter::Gz(builder) => append_bytes(builder, dest, contents),
            DumpWriter::Bz2(builder) => append_bytes(builder, dest, contents),
            DumpWriter::Xz(builder) => append_bytes(builder, dest, contents),
            DumpWriter::Folder(root) => {
                let path = root.join(dest);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, contents)?;
                Ok(())
            }
        }
    }

    /// Flush the archive trailer and the compression stream.
    pub fn finish(self) -> Result<(), AppError> {
        match self {
            DumpWriter::Tar(builder) => builder.into_inner()?.flush()?,
            DumpWriter::Gz(builder) => builder.into_inner()?.finish()?.flush()?,
            DumpWriter::Bz2(builder) => builder.into_inner()?.finish()?.flush()?,
            DumpWriter::Xz(builder) => builder.into_inner()?.finish()?.flush()?,
            DumpWriter::Folder(_) => {}
        }
        Ok(())
    }
}

fn append_file<W: Write>(
    builder: &mut Builder<W>,
    dest: &Path,
    source: &Path,
) -> Result<u64, AppError> {
    builder.append_path_with_name(source, dest)?;
    Ok(fs::metadata(source)?.len())
}

fn append_bytes<W: Write>(
    builder: &mut Builder<W>,
    dest: &Path,
    contents: &[u8],
) -> Result<(), AppError> {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default(),
    );
    builder.append_data(&mut header, dest, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Scope;
    use tempfile::tempdir;

    fn archive_options(target: Option<PathBuf>, compression: Compression) -> BackupOptions {
        BackupOptions {
            compose_files: Vec::new(),
            project_dir: PathBuf::from("."),
            project_name: "demo".to_string(),
            scopes: Scope::ALL.to_vec(),
            compression: Some(compression),
            target,
            target_type: TargetType::Archive,
            services: Vec::new(),
            pause: true,
            resolve_symlinks: false,
            verbose: false,
        }
    }

    #[test]
    fn folder_writer_copies_files_and_bytes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.txt");
        fs::write(&source, "payload").unwrap();

        let mut writer = DumpWriter::Folder(dir.path().join("out"));
        let size = writer.store_file(Path::new("config/source.txt"), &source).unwrap();
        writer.store_bytes(Path::new("Manifest.json"), b"{}").unwrap();
        writer.finish().unwrap();

        assert_eq!(size, 7);
        assert_eq!(
            fs::read_to_string(dir.path().join("out/config/source.txt")).unwrap(),
            "payload"
        );
        assert_eq!(fs::read_to_string(dir.path().join("out/Manifest.json")).unwrap(), "{}");
    }

    #[test]
    fn plain_tar_archive_is_readable_back() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "abc").unwrap();
        let target = dir.path().join("dump.tar");

        let mut writer =
            DumpWriter::create(&archive_options(Some(target.clone()), Compression::Tar)).unwrap();
        writer.store_file(Path::new("config/a.txt"), &source).unwrap();
        writer.store_bytes(Path::new("Manifest.json"), b"{}").unwrap();
        writer.finish().unwrap();

        let mut archive = tar::Archive::new(File::open(&target).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config/a.txt".to_string(), "Manifest.json".to_string()]);
    }

    #[test]
    fn gzip_archive_starts_with_magic_bytes() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("dump.tar.gz");

        let mut writer =
            DumpWriter::create(&archive_options(Some(target.clone()), Compression::Gz)).unwrap();
        writer.store_bytes(Path::new("Manifest.json"), b"{}").unwrap();
        writer.finish().unwrap();

        let bytes = fs::read(&target).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }
}
