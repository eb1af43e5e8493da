//! Content-addressed incremental compilation cache.
//!
//! One file per cached emission under a fixed temp-directory subfolder,
//! named by content hash, plus a `cache_index.txt` with pipe-delimited
//! `file_path|content_hash|timestamp` records. A lookup hits when the
//! recorded hash matches a fresh hash of the current source text.

use indexmap::IndexMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cache subdirectory under the platform temp dir.
pub const CACHE_DIR_NAME: &str = "mana_cache";

const INDEX_FILE: &str = "cache_index.txt";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Positional Fowler–Noll–Vo-style content hash: stable within one build,
/// not cryptographic.
pub fn content_hash(content: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for (position, byte) in content.bytes().enumerate() {
        let weighted = (byte as u64).wrapping_mul(position as u64 + 1);
        hash = hash.wrapping_mul(FNV_PRIME).wrapping_add(weighted);
    }
    format!("{:x}", hash)
}

#[derive(Clone, Debug)]
struct CacheEntry {
    content_hash: String,
    timestamp: u64,
}

/// The on-disk cache. Entries keep insertion order so the index file is
/// rewritten deterministically.
pub struct CompilationCache {
    dir: PathBuf,
    entries: IndexMap<String, CacheEntry>,
}

impl CompilationCache {
    /// Opens (creating if needed) the cache under `dir` and loads its
    /// index.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let mut cache = Self {
            dir,
            entries: IndexMap::new(),
        };
        cache.load_index();
        Ok(cache)
    }

    /// Opens the default cache location: `<temp>/mana_cache`.
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(std::env::temp_dir().join(CACHE_DIR_NAME))
    }

    /// Whether the cached emission for `file_path` still corresponds to
    /// `content`.
    pub fn is_fresh(&self, file_path: &str, content: &str) -> bool {
        match self.entries.get(file_path) {
            Some(entry) => entry.content_hash == content_hash(content),
            None => false,
        }
    }

    /// Reads the cached emission for `file_path`, if any.
    pub fn load(&self, file_path: &str) -> Option<String> {
        let entry = self.entries.get(file_path)?;
        fs::read_to_string(self.entry_path(&entry.content_hash)).ok()
    }

    /// Stores an emission for `file_path` keyed by the hash of `content`.
    pub fn store(&mut self, file_path: &str, content: &str, cpp: &str) -> Result<(), CacheError> {
        let hash = content_hash(content);
        let path = self.entry_path(&hash);
        fs::write(&path, cpp).map_err(|source| CacheError::Write { path, source })?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.entries.insert(
            file_path.to_string(),
            CacheEntry {
                content_hash: hash,
                timestamp,
            },
        );
        self.save_index()
    }

    /// Drops the entry for one file, removing its cached emission.
    pub fn invalidate(&mut self, file_path: &str) -> Result<(), CacheError> {
        if let Some(entry) = self.entries.shift_remove(file_path) {
            let _ = fs::remove_file(self.entry_path(&entry.content_hash));
            self.save_index()?;
        }
        Ok(())
    }

    /// Removes every cached emission and the index.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        for entry in self.entries.values() {
            let _ = fs::remove_file(self.entry_path(&entry.content_hash));
        }
        self.entries.clear();
        self.save_index()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.cpp", hash))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn load_index(&mut self) {
        let Ok(text) = fs::read_to_string(self.index_path()) else {
            return;
        };
        self.entries.clear();
        for line in text.lines() {
            let mut parts = line.splitn(3, '|');
            let (Some(path), Some(hash), Some(timestamp)) =
                (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            self.entries.insert(
                path.to_string(),
                CacheEntry {
                    content_hash: hash.to_string(),
                    timestamp: timestamp.parse().unwrap_or(0),
                },
            );
        }
    }

    fn save_index(&self) -> Result<(), CacheError> {
        let mut text = String::new();
        for (path, entry) in &self.entries {
            text.push_str(&format!(
                "{}|{}|{}\n",
                path, entry.content_hash, entry.timestamp
            ));
        }
        let path = self.index_path();
        fs::write(&path, text).map_err(|source| CacheError::Write { path, source })
    }
}
