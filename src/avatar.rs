//! Character avatar loading
//!
//! Avatars are downloaded once and cached on disk keyed by character id:
//! ~/.cache/roster/avatars/<id>.img on Linux
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ApiError;

/// Cache file for a character id, or `None` for an empty id
///
/// Plain alphanumeric ids are used as-is. Anything else is hex encoded
/// behind a `_` prefix, which no plain id can start with, so distinct ids
/// never share a file.
pub fn avatar_path(cache_dir: &Path, id: &str) -> Option<PathBuf> {
    if id.is_empty() {
        return None;
    }
    let stem = if id.chars().all(|c| c.is_ascii_alphanumeric()) {
        id.to_string()
    } else {
        format!("_{}", hex::encode(id))
    };
    Some(cache_dir.join(format!("{stem}.img")))
}

/// Load avatar bytes for a character
///
/// Reads the cache when present, otherwise downloads `url` and stores
/// the result. A failed cache write is logged and the bytes are still
/// returned.
pub async fn load_avatar(
    http: reqwest::Client,
    cache_dir: Option<PathBuf>,
    id: String,
    url: String,
) -> Result<Vec<u8>, ApiError> {
    let cached_path = cache_dir.as_deref().and_then(|dir| avatar_path(dir, &id));

    if let Some(path) = &cached_path {
        if let Ok(bytes) = tokio::fs::read(path).await {
            if !bytes.is_empty() {
                debug!(id = %id, "avatar served from cache");
                return Ok(bytes);
            }
        }
    }

    let bytes = http
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?
        .to_vec();
    debug!(id = %id, bytes = bytes.len(), "downloaded avatar");

    if let Some(path) = &cached_path {
        if let Err(e) = write_cache(path, &bytes).await {
            warn!(id = %id, path = %path.display(), error = %e, "failed to cache avatar");
        }
    }

    Ok(bytes)
}

async fn write_cache(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}
