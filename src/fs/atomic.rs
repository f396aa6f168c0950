//! Atomic file replacement.
//!
//! Every write follows the same pattern:
//! 1. Write content to a temporary file next to the target
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! The temporary name carries the writer's pid so two processes writing the
//! same target never share a temp file. On POSIX `rename()` is atomic when
//! source and destination live on the same filesystem.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `content`, creating parent directories.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path)?;

    if let Err(e) = write_and_sync(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    // Persist the directory entry as well. Opening a directory fails on
    // Windows, which simply skips this step.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// `.{filename}.{pid}.tmp` in the same directory as the target.
fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file path '{}'", target.display()),
            )
        })?;

    Ok(parent.join(format!(".{}.{}.tmp", filename, std::process::id())))
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
