//! Locked file primitives shared by the stores.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fd_lock::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use hotspot_core::errors::StorageError;

fn io_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn lock_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Lock {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Read and deserialize a JSON document. `Ok(None)` when the file does not
/// exist or is empty.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut lock = RwLock::new(file);
    let guard = lock.read().map_err(|e| lock_error(path, e))?;

    let mut content = String::new();
    let mut reader: &File = &guard;
    reader
        .read_to_string(&mut content)
        .map_err(|e| io_error(path, e))?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StorageError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Serialize and overwrite a JSON document under an exclusive lock,
/// creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| StorageError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    let mut lock = RwLock::new(file);
    let mut guard = lock.write().map_err(|e| lock_error(path, e))?;

    guard.set_len(0).map_err(|e| io_error(path, e))?;
    guard
        .seek(SeekFrom::Start(0))
        .map_err(|e| io_error(path, e))?;
    guard
        .write_all(json.as_bytes())
        .map_err(|e| io_error(path, e))?;
    guard.flush().map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Append a line of text under an exclusive lock. Returns whether the file
/// was empty before the write, so callers can emit headers first.
pub fn append_line(path: &Path, line: &str) -> Result<bool, StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    let mut lock = RwLock::new(file);
    let mut guard = lock.write().map_err(|e| lock_error(path, e))?;

    let was_empty = guard.metadata().map_err(|e| io_error(path, e))?.len() == 0;
    guard
        .write_all(line.as_bytes())
        .map_err(|e| io_error(path, e))?;
    guard.write_all(b"\n").map_err(|e| io_error(path, e))?;
    guard.flush().map_err(|e| io_error(path, e))?;
    Ok(was_empty)
}
