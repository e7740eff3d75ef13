//! Content-hash keyed embedding cache.
//!
//! Persists one embedding per doc_id together with the content hash it was
//! computed from. An entry is served only while its stored hash matches
//! the document's current hash; stale entries are overwritten wholesale on
//! the next `put`, never merged.
//!
//! Backed by an embedded SQLite store (WAL mode) so each `put` is an
//! atomic, durable per-key upsert rather than a whole-file rewrite.
//! Concurrent get-then-put races for the same doc_id are last-write-wins,
//! which is acceptable: both writers computed the embedding from identical
//! content.

use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{LoupeError, Result};
use crate::vector::Vector;

/// Durable doc_id → (embedding, content_hash, updated_at) store.
#[derive(Debug)]
pub struct EmbeddingCache {
    conn: Mutex<Connection>,
}

impl EmbeddingCache {
    /// Open (or create) the cache store at the given path.
    ///
    /// A store that exists but cannot be opened or fails schema setup is a
    /// fatal [`LoupeError::CacheStore`] error: starting silently empty
    /// would re-pay the full embedding cost without the operator noticing,
    /// so the decision to delete or repair is left to them.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| LoupeError::cache_store(format!("cannot open {path:?}: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| LoupeError::cache_store(format!("cannot enable WAL: {e}")))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embeddings (
                doc_id       TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL,
                dimension    INTEGER NOT NULL,
                embedding    BLOB NOT NULL,
                updated_at   TEXT NOT NULL
            );",
        )
        .map_err(|e| LoupeError::cache_store(format!("cannot initialize schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Return the cached embedding for `doc_id` if one exists and was
    /// computed from content with the given hash; `None` signals
    /// "recompute".
    pub fn get(&self, doc_id: &str, content_hash: &str) -> Result<Option<Vector>> {
        let conn = self.conn.lock();
        let row: Option<(String, i64, Vec<u8>)> = conn
            .query_row(
                "SELECT content_hash, dimension, embedding FROM embeddings WHERE doc_id = ?1",
                params![doc_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| LoupeError::cache_store(format!("cache read failed: {e}")))?;

        let Some((stored_hash, dimension, blob)) = row else {
            return Ok(None);
        };
        if stored_hash != content_hash {
            return Ok(None);
        }

        let embedding = decode_embedding(&blob, dimension as usize)?;
        Ok(Some(embedding))
    }

    /// Upsert the entry for `doc_id`, replacing any prior value.
    ///
    /// Durable before the call returns.
    pub fn put(&self, doc_id: &str, embedding: &Vector, content_hash: &str) -> Result<()> {
        let blob = encode_embedding(embedding);
        let updated_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO embeddings (doc_id, content_hash, dimension, embedding, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(doc_id) DO UPDATE SET
                 content_hash = excluded.content_hash,
                 dimension = excluded.dimension,
                 embedding = excluded.embedding,
                 updated_at = excluded.updated_at",
            params![
                doc_id,
                content_hash,
                embedding.dimension() as i64,
                blob,
                updated_at
            ],
        )
        .map_err(|e| LoupeError::cache_store(format!("cache write failed: {e}")))?;
        Ok(())
    }

    /// Number of cached entries.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))
            .map_err(|e| LoupeError::cache_store(format!("cache count failed: {e}")))?;
        Ok(count as usize)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn encode_embedding(embedding: &Vector) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.data.len() * 4);
    for value in &embedding.data {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn decode_embedding(blob: &[u8], dimension: usize) -> Result<Vector> {
    if blob.len() != dimension * 4 {
        return Err(LoupeError::cache_store(format!(
            "embedding blob size mismatch: expected {} bytes for dimension {dimension}, got {}",
            dimension * 4,
            blob.len()
        )));
    }
    let mut data = Vec::with_capacity(dimension);
    for chunk in blob.chunks_exact(4) {
        data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(Vector::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_entry_is_none() -> Result<()> {
        let dir = tempdir()?;
        let cache = EmbeddingCache::open(&dir.path().join("cache.db"))?;
        assert!(cache.get("a.txt", "hash")?.is_none());
        Ok(())
    }

    #[test]
    fn test_put_get_roundtrip_exact() -> Result<()> {
        let dir = tempdir()?;
        let cache = EmbeddingCache::open(&dir.path().join("cache.db"))?;

        let embedding = Vector::new(vec![0.25, -1.5, 3.75]);
        cache.put("a.txt", &embedding, "hash1")?;

        let cached = cache.get("a.txt", "hash1")?.expect("entry should exist");
        assert_eq!(cached.data, embedding.data);
        Ok(())
    }

    #[test]
    fn test_get_with_stale_hash_is_none() -> Result<()> {
        let dir = tempdir()?;
        let cache = EmbeddingCache::open(&dir.path().join("cache.db"))?;

        cache.put("a.txt", &Vector::new(vec![1.0]), "old-hash")?;
        assert!(cache.get("a.txt", "new-hash")?.is_none());
        Ok(())
    }

    #[test]
    fn test_put_overwrites_wholesale() -> Result<()> {
        let dir = tempdir()?;
        let cache = EmbeddingCache::open(&dir.path().join("cache.db"))?;

        cache.put("a.txt", &Vector::new(vec![1.0, 2.0]), "h1")?;
        cache.put("a.txt", &Vector::new(vec![3.0]), "h2")?;

        assert!(cache.get("a.txt", "h1")?.is_none());
        let cached = cache.get("a.txt", "h2")?.expect("entry should exist");
        assert_eq!(cached.data, vec![3.0]);
        assert_eq!(cache.len()?, 1);
        Ok(())
    }

    #[test]
    fn test_persists_across_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cache.db");

        {
            let cache = EmbeddingCache::open(&path)?;
            cache.put("a.txt", &Vector::new(vec![0.5, 0.5]), "h")?;
        }

        let cache = EmbeddingCache::open(&path)?;
        let cached = cache.get("a.txt", "h")?.expect("entry should survive reopen");
        assert_eq!(cached.data, vec![0.5, 0.5]);
        Ok(())
    }

    #[test]
    fn test_open_unreadable_store_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cache.db");
        std::fs::write(&path, b"this is not a sqlite database, not even close")?;

        let result = EmbeddingCache::open(&path);
        assert!(matches!(result, Err(LoupeError::CacheStore(_))));
        Ok(())
    }
}
