pub mod ledger;
pub mod queue;

use actix_web::web;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a JSON document, treating a missing file as empty.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(T::default()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Loads at startup; an unreadable file is logged and replaced by an empty one.
fn load_or_empty<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Could not read {} at {}: {}. Starting empty.", what, path.display(), e);
            T::default()
        }
    }
}

/// Loads at startup; a file that exists but cannot be parsed is renamed
/// aside so the next write does not destroy it.
fn load_or_quarantine<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T, StoreError> {
    match read_json(path) {
        Ok(value) => Ok(value),
        Err(e) => {
            let backup = quarantine_path(path);
            std::fs::rename(path, &backup)?;
            log::error!(
                "Could not read {} at {}: {}. Moved it to {} and starting empty.",
                what,
                path.display(),
                e,
                backup.display()
            );
            Ok(T::default())
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(format!(".corrupt-{}", stamp));
    path.with_file_name(name)
}

/// Writes through a sibling temp file so readers never see a torn document.
/// The file system work runs on the blocking pool.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();
    web::block(move || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)
    })
    .await
    .map_err(std::io::Error::other)??;
    Ok(())
}
