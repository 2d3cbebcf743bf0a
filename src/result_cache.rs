use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const MATCHES_TTL: Duration = Duration::from_secs(3600);
pub const EVENTS_TTL: Duration = Duration::from_secs(1800);
pub const SQUADS_TTL: Duration = Duration::from_secs(86400);

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "futsal_pulse";
const CACHE_FILE: &str = "result_cache.json";

static SHARED: OnceCell<Arc<MemoryCache>> = OnceCell::new();

/// Expiring key/value store shared by every request in the process.
///
/// Values are serialized JSON so any backend (in-process map, file, or an
/// external store) can hold them.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, ttl: Duration);
}

/// Builds the cache key for a query: its name followed by every argument
/// that affects the result.
pub fn fingerprint(query: &str, args: &[&str]) -> String {
    let mut key = String::from(query);
    for arg in args {
        key.push('|');
        key.push_str(arg);
    }
    key
}

pub fn lookup<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let raw = cache.get(key)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, %err, "discarding undecodable cache entry");
            None
        }
    }
}

pub fn store<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.set(key, raw, ttl),
        Err(err) => tracing::warn!(key, %err, "failed to serialize cache entry"),
    }
}

/// Returns the cached value for `key` or runs `fetch` and caches its success.
/// Errors are passed through and never cached.
pub fn memoize<T, E, F>(cache: &dyn Cache, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>,
{
    if let Some(hit) = lookup::<T>(cache, key) {
        tracing::debug!(key, "cache hit");
        return Ok(hit);
    }
    let value = fetch()?;
    store(cache, key, &value, ttl);
    Ok(value)
}

pub fn shared_cache() -> Arc<MemoryCache> {
    SHARED.get_or_init(|| Arc::new(MemoryCache::new())).clone()
}

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MemoryEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

/// On-disk layout of the file backend. Expiry is wall-clock seconds so
/// every process reading the file agrees on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Snapshot {
    version: u32,
    entries: HashMap<String, FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    body: String,
    expires_at: u64,
}

impl Snapshot {
    /// Missing, unreadable or outdated files read as empty.
    fn read(path: &Path) -> Self {
        let parsed = fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Snapshot>(&raw).ok());
        match parsed {
            Some(snapshot) if snapshot.version == CACHE_VERSION => snapshot,
            _ => Snapshot {
                version: CACHE_VERSION,
                entries: HashMap::new(),
            },
        }
    }

    fn live(&self, key: &str, now: u64) -> Option<&FileEntry> {
        self.entries.get(key).filter(|e| e.expires_at > now)
    }

    /// Writes to a per-process temp file and renames it over `path`, so
    /// readers never observe a half-written snapshot.
    fn replace(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create cache dir {}", dir.display()))?;
        }
        let tmp = path.with_extension(format!("{}.tmp", std::process::id()));
        let json = serde_json::to_vec(self).context("serialize result cache")?;
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))
    }
}

/// JSON-file cache so several processes on one host can share results.
///
/// Every read goes to disk and every write merges into the file's current
/// contents, so entries stored by other processes are seen and kept.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn at_default_location() -> Option<Self> {
        app_cache_dir().map(|dir| Self::new(dir.join(CACHE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        Snapshot::read(&self.path)
            .live(key, now_secs())
            .map(|e| e.body.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let now = now_secs();
        let mut snapshot = Snapshot::read(&self.path);
        snapshot.entries.retain(|_, e| e.expires_at > now);
        snapshot.entries.insert(
            key.to_string(),
            FileEntry {
                body: value,
                expires_at: now.saturating_add(ttl.as_secs()),
            },
        );
        if let Err(err) = snapshot.replace(&self.path) {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist result cache");
        }
    }
}

/// Per-user cache directory: `$XDG_CACHE_HOME/futsal_pulse`, else
/// `~/.cache/futsal_pulse`.
pub fn app_cache_dir() -> Option<PathBuf> {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    non_empty("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .map(|base| base.join(CACHE_DIR))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
