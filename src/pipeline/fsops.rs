//! Filesystem primitives used by the pipeline stages.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::error::PipelineError;

/// Create `dir` and its parents unless it already exists.
///
/// Safe to call from many workers at once: losing a creation race to another
/// thread is not an error.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Move `from` into directory `dir`, keeping its file name and replacing any
/// file of the same name already there. Returns the new path.
pub fn move_into(from: &Path, dir: &Path) -> io::Result<PathBuf> {
    let name = from.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", from.display()),
        )
    })?;
    ensure_dir(dir)?;
    let to = dir.join(name);

    match fs::rename(from, &to) {
        Ok(()) => Ok(to),
        Err(rename_err) => {
            // rename cannot cross filesystems; fall back to copy + remove
            if !from.is_file() || fs::copy(from, &to).is_err() {
                return Err(rename_err);
            }
            debug!("Moved {} by copy after rename failed: {}", from.display(), rename_err);
            finish_copy(from, to, |path| fs::remove_file(path))
        }
    }
}

/// Remove the original after a copy to `to`.
///
/// If the original cannot be removed the copy is deleted again, so the file
/// exists in exactly one place whatever the outcome.
fn finish_copy<F>(from: &Path, to: PathBuf, remove_original: F) -> io::Result<PathBuf>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    match remove_original(from) {
        Ok(()) => Ok(to),
        Err(err) => {
            if let Err(cleanup_err) = fs::remove_file(&to) {
                warn!("Could not remove copy {}: {}", to.display(), cleanup_err);
            }
            Err(err)
        }
    }
}

/// Write `text` to `path` through a buffered writer, replacing existing content
pub fn write_text(path: &Path, text: &str) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

/// List the files to convert.
///
/// A directory yields its regular files sorted by name; a file yields itself.
/// Paths are absolute.
pub fn list_source_files(source: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let unreadable = |source_err: io::Error| PipelineError::SourceUnreadable {
        path: source.display().to_string(),
        source: source_err,
    };

    let source = fs::canonicalize(source).map_err(unreadable)?;
    if source.is_file() {
        return Ok(vec![source]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&source).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_move_into_replaces_existing() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("run.mat");
        let target = dir.path().join("processed");
        fs::create_dir_all(&target).unwrap();
        fs::write(&from, b"new").unwrap();
        fs::write(target.join("run.mat"), b"old").unwrap();

        let moved = move_into(&from, &target).unwrap();

        assert_eq!(moved, target.join("run.mat"));
        assert!(!from.exists());
        assert_eq!(fs::read(&moved).unwrap(), b"new");
    }

    #[test]
    fn test_failed_removal_drops_the_copy() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("run.mat");
        let to = dir.path().join("run_copy.mat");
        fs::write(&from, b"data").unwrap();
        fs::copy(&from, &to).unwrap();

        let result = finish_copy(&from, to.clone(), |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only source"))
        });

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
        assert!(from.exists());
        assert!(!to.exists());
    }

    #[test]
    fn test_successful_removal_keeps_the_copy() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("run.mat");
        let to = dir.path().join("run_copy.mat");
        fs::write(&from, b"data").unwrap();
        fs::copy(&from, &to).unwrap();

        let result = finish_copy(&from, to.clone(), |path| fs::remove_file(path));

        assert_eq!(result.unwrap(), to);
        assert!(!from.exists());
        assert!(to.exists());
    }
}
