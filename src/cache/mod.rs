//! Cache module for incremental generation
//!
//! Tracks a content hash per fetched post so regeneration (and the dev
//! server's CMS poll) only rewrites output when something actually changed.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Cache file name
const CACHE_FILE: &str = ".astra-cache/db.json";

/// Cached state of one rendered post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hash of the normalized post content
    pub content_hash: u64,
    /// Output path relative to the public dir
    pub output_path: String,
}

/// Cache database for tracking content changes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Hash of the site config (changes trigger a full rebuild)
    pub config_hash: u64,
    /// Cached entries keyed by post uid
    pub posts: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load cache from disk, or start empty
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, rebuilding cache");
            }
        }
        Self::default()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// Build a fresh cache from the current fetch
    pub fn from_posts(config_hash: u64, posts: &[(String, u64, String)]) -> Self {
        let entries = posts
            .iter()
            .map(|(uid, hash, output_path)| {
                (
                    uid.clone(),
                    CacheEntry {
                        content_hash: *hash,
                        output_path: output_path.clone(),
                    },
                )
            })
            .collect();

        Self {
            version: Self::VERSION,
            config_hash,
            posts: entries,
        }
    }

    /// Whether the cache has never seen a generation pass
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Change detection result
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Posts that need regeneration (uid)
    pub changed_posts: Vec<String>,
    /// Posts that disappeared upstream (uid, cached output path)
    pub deleted_posts: Vec<(String, String)>,
    /// Whether listing pages need regeneration
    pub rebuild_index: bool,
    /// Whether to regenerate everything (config changed or cache empty)
    pub full_rebuild: bool,
}

impl ChangeSet {
    /// A changeset forcing a full rebuild
    pub fn full_rebuild() -> Self {
        Self {
            rebuild_index: true,
            full_rebuild: true,
            ..Default::default()
        }
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        self.full_rebuild
            || self.rebuild_index
            || !self.changed_posts.is_empty()
            || !self.deleted_posts.is_empty()
    }

    /// Summary of changes for logging
    pub fn summary(&self) -> String {
        if self.full_rebuild {
            return "full rebuild required".to_string();
        }

        let mut parts = Vec::new();
        if !self.changed_posts.is_empty() {
            parts.push(format!("{} posts changed", self.changed_posts.len()));
        }
        if !self.deleted_posts.is_empty() {
            parts.push(format!("{} posts deleted", self.deleted_posts.len()));
        }
        if self.rebuild_index {
            parts.push("listing pages".to_string());
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Compare the current fetch against the cache.
///
/// `current` holds `(uid, content_hash)` in listing order. Any change to the
/// set or content of posts also invalidates the listing pages, since cards
/// and adjacent-post links depend on neighbors.
pub fn detect_changes(cache: &CacheDb, config_hash: u64, current: &[(String, u64)]) -> ChangeSet {
    if cache.is_empty() || cache.config_hash != config_hash {
        return ChangeSet::full_rebuild();
    }

    let mut changeset = ChangeSet::default();

    for (uid, hash) in current {
        match cache.posts.get(uid) {
            Some(entry) if entry.content_hash == *hash => {}
            _ => changeset.changed_posts.push(uid.clone()),
        }
    }

    for (uid, entry) in &cache.posts {
        if !current.iter().any(|(u, _)| u == uid) {
            changeset
                .deleted_posts
                .push((uid.clone(), entry.output_path.clone()));
        }
    }

    changeset.rebuild_index =
        !changeset.changed_posts.is_empty() || !changeset.deleted_posts.is_empty();

    changeset
}

/// Calculate a hash for content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> CacheDb {
        CacheDb::from_posts(
            7,
            &[
                ("a".to_string(), 1, "post/a".to_string()),
                ("b".to_string(), 2, "post/b".to_string()),
            ],
        )
    }

    #[test]
    fn test_no_changes_detected() {
        let current = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let changes = detect_changes(&cache(), 7, &current);
        assert!(!changes.has_changes());
        assert_eq!(changes.summary(), "no changes");
    }

    #[test]
    fn test_changed_and_new_posts() {
        let current = vec![
            ("a".to_string(), 99),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ];
        let changes = detect_changes(&cache(), 7, &current);
        assert_eq!(changes.changed_posts, vec!["a", "c"]);
        assert!(changes.rebuild_index);
        assert!(!changes.full_rebuild);
    }

    #[test]
    fn test_deleted_posts() {
        let current = vec![("a".to_string(), 1)];
        let changes = detect_changes(&cache(), 7, &current);
        assert_eq!(
            changes.deleted_posts,
            vec![("b".to_string(), "post/b".to_string())]
        );
        assert!(changes.rebuild_index);
    }

    #[test]
    fn test_config_change_forces_full_rebuild() {
        let current = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let changes = detect_changes(&cache(), 8, &current);
        assert!(changes.full_rebuild);
    }

    #[test]
    fn test_empty_cache_forces_full_rebuild() {
        let changes = detect_changes(&CacheDb::default(), 7, &[]);
        assert!(changes.full_rebuild);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let db = cache();
        db.save(dir.path()).unwrap();

        let loaded = CacheDb::load(dir.path());
        assert_eq!(loaded.config_hash, 7);
        assert_eq!(loaded.posts.len(), 2);
    }

    #[test]
    fn test_hash_content_is_stable() {
        assert_eq!(hash_content("abc"), hash_content("abc"));
        assert_ne!(hash_content("abc"), hash_content("abd"));
    }
}
