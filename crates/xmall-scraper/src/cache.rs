//! File-backed cache of extraction results, one JSON file per URL.
//!
//! Files are named `<md5(url)>.json` and hold `{url, created_at, data}`.
//! Validity is judged by file modification time, so there is no separate
//! index. Every public method absorbs I/O and decode failures: they are
//! logged and reported as a miss or a `false` return.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const SECS_PER_DAY: u64 = 86_400;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A cache file's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    /// Epoch seconds at write time.
    pub created_at: i64,
    pub data: Value,
}

/// Summary of one cache file for operator listings.
#[derive(Debug, Clone, Serialize)]
pub struct CacheListing {
    pub file_name: String,
    pub url: String,
    pub created_at: i64,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

#[derive(Debug, Error)]
pub(crate) enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cache JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Derives the cache file stem for a URL: the lowercase hex MD5 of its bytes.
///
/// The URL is hashed as given. Callers decide how to normalize it.
#[must_use]
pub fn cache_key(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}

/// Directory of cache files with a default maximum age.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    max_age_days: i64,
}

impl CacheStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    ///
    /// `max_age_days` is the window used by [`CacheStore::get`]; zero or
    /// negative disables the age check.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_age_days: i64) -> Self {
        Self {
            dir: dir.into(),
            max_age_days,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }

    /// Path of the cache file for `url`, whether or not it exists.
    #[must_use]
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(url)))
    }

    /// Returns `true` if a cache file exists for `url` and is no older than
    /// `max_age_days`. Zero or negative `max_age_days` only checks existence.
    #[must_use]
    pub fn has(&self, url: &str, max_age_days: i64) -> bool {
        let path = self.path_for(url);
        let Ok(metadata) = fs::metadata(&path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }
        if max_age_days <= 0 {
            return true;
        }

        let Ok(modified) = metadata.modified() else {
            tracing::warn!(path = %path.display(), "cache file has no modification time");
            return false;
        };
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        let max_age =
            Duration::from_secs(max_age_days.unsigned_abs().saturating_mul(SECS_PER_DAY));
        age <= max_age
    }

    /// Returns the cached entry for `url` if it is within the store's age window.
    ///
    /// Unreadable or malformed files are logged and treated as a miss.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<CacheEntry> {
        if !self.has(url, self.max_age_days) {
            return None;
        }
        match self.read_entry(&self.path_for(url)) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(url, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    /// Writes `payload` as the cache entry for `url`, replacing any previous one.
    ///
    /// The file is written to a temporary name and renamed into place, so a
    /// failed or concurrent write never leaves a truncated entry behind.
    /// Returns `false` (after logging) if serialization or I/O fails.
    pub fn set<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> bool {
        match self.write_entry(url, payload) {
            Ok(path) => {
                tracing::debug!(url, path = %path.display(), "cache entry written");
                true
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to write cache entry");
                false
            }
        }
    }

    /// Like [`CacheStore::set`], but serializes on the caller and performs the
    /// file write on the blocking thread pool.
    pub async fn set_async<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> bool {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to serialize cache payload");
                return false;
            }
        };
        let store = self.clone();
        let key = url.to_string();
        match tokio::task::spawn_blocking(move || store.set(&key, &data)).await {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(url, error = %e, "cache write task failed");
                false
            }
        }
    }

    /// Removes the cache entry for `url`. A missing entry counts as success.
    pub fn delete(&self, url: &str) -> bool {
        let path = self.path_for(url);
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!(url, path = %path.display(), error = %e, "failed to delete cache entry");
                false
            }
        }
    }

    /// Removes every cache file. A missing directory counts as success.
    pub fn clear(&self) -> bool {
        let files = match self.cache_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache directory");
                return false;
            }
        };

        let mut ok = true;
        for path in files {
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove cache file");
                    ok = false;
                }
            }
        }
        ok
    }

    /// Lists readable cache entries, newest first. Unreadable files are skipped.
    #[must_use]
    pub fn list_entries(&self) -> Vec<CacheListing> {
        let files = match self.cache_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache directory");
                return Vec::new();
            }
        };

        let mut listings: Vec<CacheListing> = files
            .into_iter()
            .filter_map(|path| match self.listing(&path) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable cache file");
                    None
                }
            })
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listings
    }

    /// URLs of every readable cache entry, newest first.
    #[must_use]
    pub fn cached_urls(&self) -> Vec<String> {
        self.list_entries().into_iter().map(|l| l.url).collect()
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let reader = match fs::read_dir(&self.dir) {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.dir)(e)),
        };

        let mut files = Vec::new();
        for entry in reader {
            let path = entry.map_err(io_err(&self.dir))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn read_entry(&self, path: &Path) -> Result<CacheEntry, CacheError> {
        let bytes = fs::read(path).map_err(io_err(path))?;
        serde_json::from_slice(&bytes).map_err(|source| CacheError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn listing(&self, path: &Path) -> Result<CacheListing, CacheError> {
        let entry = self.read_entry(path)?;
        let metadata = fs::metadata(path).map_err(io_err(path))?;
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(io_err(path))?;
        Ok(CacheListing {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            url: entry.url,
            created_at: entry.created_at,
            modified_at,
            size_bytes: metadata.len(),
        })
    }

    fn write_entry<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<PathBuf, CacheError> {
        let path = self.path_for(url);
        let data = serde_json::to_value(payload).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        let entry = CacheEntry {
            url: url.to_string(),
            created_at: Utc::now().timestamp(),
            data,
        };
        let bytes = serde_json::to_vec_pretty(&entry).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(&path)(e));
        }
        Ok(path)
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
