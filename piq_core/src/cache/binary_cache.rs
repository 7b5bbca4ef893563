use std::sync::{Arc, Mutex};

use crate::types::types::{CacheError, ImageQualities, Quality};

const MEGABYTE: u64 = 1024 * 1024;

/// Eviction scopes: each quality class has its own byte budget.
/// Lossless and pixel data binaries live in the same scope since both
/// are "best quality" representations of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheScope {
    Low,
    Medium,
    High,
}

impl CacheScope {
    fn of(quality: Quality) -> CacheScope {
        match quality {
            Quality::Low => CacheScope::Low,
            Quality::Medium => CacheScope::Medium,
            Quality::Lossless | Quality::PixelData => CacheScope::High,
        }
    }

    fn budget(self) -> u64 {
        match self {
            CacheScope::Low => 300 * MEGABYTE,
            CacheScope::Medium => 700 * MEGABYTE,
            CacheScope::High => 700 * MEGABYTE,
        }
    }
}

struct CacheEntry {
    image_id: String,
    quality: Quality,
    bytes: Arc<Vec<u8>>,
    /// Accounted size; defaults to the payload length but can be
    /// overridden while a fetch is still streaming in.
    size: u64,
}

/// In-memory store of fetched image binaries, keyed by
/// `(image id, quality)`.
///
/// Feeds the quality policies: [`BinaryCache::best_quality`] is what
/// becomes [`ImageQualities::best_cached`]. Removing the entry for a
/// failed fetch is the caller's job, exactly as adding it was.
///
/// Entries are kept in insertion order; [`BinaryCache::flush`] evicts
/// oldest-first from every scope that exceeds its byte budget.
pub struct BinaryCache {
    entries: Mutex<Vec<CacheEntry>>,
}

impl BinaryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Store a binary. Double-adding the same key is a bug in the
    /// caller's bookkeeping and is rejected.
    pub fn add(&self, image_id: &str, quality: Quality, bytes: Vec<u8>) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        if entries
            .iter()
            .any(|entry| entry.image_id == image_id && entry.quality == quality)
        {
            return Err(CacheError::AlreadyCached {
                image_id: image_id.to_string(),
                quality,
            });
        }
        let size = bytes.len() as u64;
        entries.push(CacheEntry {
            image_id: image_id.to_string(),
            quality,
            bytes: Arc::new(bytes),
            size,
        });
        Ok(())
    }

    pub fn get(&self, image_id: &str, quality: Quality) -> Option<Arc<Vec<u8>>> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.image_id == image_id && entry.quality == quality)
            .map(|entry| Arc::clone(&entry.bytes))
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, image_id: &str, quality: Quality) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| !(entry.image_id == image_id && entry.quality == quality));
        entries.len() != before
    }

    /// Override the accounted size of a cached binary.
    pub fn set_binary_size(&self, image_id: &str, quality: Quality, size: u64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries
            .iter_mut()
            .find(|entry| entry.image_id == image_id && entry.quality == quality)
        {
            entry.size = size;
        }
    }

    /// Best cached quality for an image, by wire code.
    pub fn best_quality(&self, image_id: &str) -> Option<Quality> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.image_id == image_id)
            .map(|entry| entry.quality)
            .max_by_key(|quality| quality.code())
    }

    /// Build the policy input for an image from its advertised
    /// qualities and the cache state.
    pub fn qualities_for(&self, image_id: &str, available: Vec<Quality>) -> ImageQualities {
        ImageQualities {
            available,
            best_cached: self.best_quality(image_id),
        }
    }

    /// Evict oldest entries from every scope over its byte budget.
    pub fn flush(&self) {
        let mut entries = self.entries.lock().unwrap();
        for scope in [CacheScope::Low, CacheScope::Medium, CacheScope::High] {
            let mut total: u64 = entries
                .iter()
                .filter(|entry| CacheScope::of(entry.quality) == scope)
                .map(|entry| entry.size)
                .sum();
            while total > scope.budget() {
                let Some(oldest) = entries
                    .iter()
                    .position(|entry| CacheScope::of(entry.quality) == scope)
                else {
                    break;
                };
                let evicted = entries.remove(oldest);
                log::debug!(
                    "flushed {} ({}) from binary cache, {} bytes",
                    evicted.image_id,
                    evicted.quality,
                    evicted.size
                );
                total -= evicted.size;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.lock().unwrap().iter().map(|entry| entry.size).sum()
    }
}

impl Default for BinaryCache {
    fn default() -> Self {
        Self::new()
    }
}
