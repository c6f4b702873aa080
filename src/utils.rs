use std::path::Path;

use byte_unit::{Byte, UnitType};
use globset::GlobSet;

use crate::error::AppError;

/// Format bytes into a human-readable string.
pub fn format_bytes(size: u64) -> String {
    if size == 0 {
        "0 B".to_string()
    } else {
        let adjusted = Byte::from_u64(size).get_appropriate_unit(UnitType::Decimal);
        format!("{adjusted:#.2}")
    }
}

pub fn ensure_directory(path: &Path) -> Result<(), AppError> {
    if path.is_dir() { Ok(()) } else { Err(AppError::MissingDirectory(path.to_path_buf())) }
}

pub fn is_excluded(path: &Path, exclude: Option<&GlobSet>) -> bool {
    if let Some(set) = exclude {
        let candidate = if path.is_absolute() {
            path.to_string_lossy().to_string()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(path).to_string_lossy().to_string(),
                Err(_) => path.to_string_lossy().to_string(),
            }
        };
        set.is_match(&candidate)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes_formats_as_zero() {
        assert_eq!(format_bytes(0), "0 B");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = ensure_directory(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("No such directory"));
    }
}
