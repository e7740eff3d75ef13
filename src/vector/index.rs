//! Persisted flat vector index.
//!
//! The index stores L2-normalized embeddings in a contiguous f32 slab with
//! a parallel, positionally aligned list of doc_ids: row `i` of the slab
//! belongs to `doc_ids[i]`, and `len(vectors) == len(doc_ids)` always
//! holds. The structure is immutable after build; a rebuild replaces the
//! whole index.
//!
//! On disk the index is two co-located artifacts:
//!
//! - the vector blob (little-endian):
//!   magic `LVX1` (4 bytes), version u16, dimension u32, count u32,
//!   header CRC32 u32, then `count * dimension` f32 values;
//! - a JSON sidecar (`<path>.meta.json`) holding the ordered doc_id list
//!   plus the expected dimension and count.
//!
//! Both must be present and mutually consistent or the load fails with
//! [`LoupeError::IndexCorrupt`].

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, Result};
use crate::vector::similarity::dot_product;
use crate::vector::vector::Vector;

pub const INDEX_MAGIC: [u8; 4] = *b"LVX1";
pub const INDEX_VERSION: u16 = 1;

/// Byte length of the blob header, CRC included.
const HEADER_LEN: usize = 4 + 2 + 4 + 4 + 4;

/// A single nearest-neighbor hit from the index stage.
///
/// `score` is a cosine similarity in [-1, 1]: both the query and the
/// stored rows are L2-normalized before the inner-product comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f32,
}

/// Sidecar metadata persisted next to the vector blob.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSidecar {
    dimension: usize,
    count: usize,
    doc_ids: Vec<String>,
}

/// Flat cosine-similarity index over document embeddings.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    /// Row-major slab of normalized vectors, `count * dimension` values.
    vectors: Vec<f32>,
    doc_ids: Vec<String>,
}

impl VectorIndex {
    /// Build an index from positionally aligned embeddings and doc_ids.
    ///
    /// Every embedding must have the same length (the first one fixes the
    /// dimension) or the build fails with
    /// [`LoupeError::DimensionMismatch`] before any state is produced.
    /// Duplicate doc_ids are rejected: doc_id is the sole join key between
    /// the index and every other store.
    pub fn build(mut embeddings: Vec<Vector>, doc_ids: Vec<String>) -> Result<Self> {
        if embeddings.len() != doc_ids.len() {
            return Err(LoupeError::other(format!(
                "embeddings and doc_ids must be aligned: {} vectors vs {} ids",
                embeddings.len(),
                doc_ids.len()
            )));
        }

        let dimension = embeddings.first().map(|v| v.dimension()).unwrap_or(0);
        for vector in &embeddings {
            vector.validate_dimension(dimension)?;
        }

        let mut seen = AHashSet::with_capacity(doc_ids.len());
        for doc_id in &doc_ids {
            if !seen.insert(doc_id.as_str()) {
                return Err(LoupeError::other(format!("duplicate doc_id: {doc_id}")));
            }
        }

        Vector::normalize_batch(&mut embeddings);

        let mut vectors = Vec::with_capacity(embeddings.len() * dimension);
        for vector in &embeddings {
            vectors.extend_from_slice(&vector.data);
        }

        Ok(Self {
            dimension,
            vectors,
            doc_ids,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Dimensionality of the indexed embeddings.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The ordered doc_id list, aligned with the vector rows.
    pub fn doc_ids(&self) -> &[String] {
        &self.doc_ids
    }

    /// Exact k-nearest-neighbor search by cosine similarity.
    ///
    /// Returns `min(k, len)` hits sorted by descending score; equal scores
    /// are broken by ascending doc_id so repeated calls on the same index
    /// are deterministic.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        query.validate_dimension(self.dimension)?;
        let query = query.normalized();

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, values)| (dot_product(values, &query.data), row))
            .collect();
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| self.doc_ids[a.1].cmp(&self.doc_ids[b.1]))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, row)| SearchHit {
                doc_id: self.doc_ids[row].clone(),
                score,
            })
            .collect())
    }

    /// Persist the index as a vector blob plus JSON sidecar.
    ///
    /// Both artifacts are written through a temp file and renamed into
    /// place, so a crash mid-save never leaves a half-written index at the
    /// target path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut blob = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        blob.extend_from_slice(&INDEX_MAGIC);
        blob.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        blob.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        blob.extend_from_slice(&(self.len() as u32).to_le_bytes());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&blob);
        blob.extend_from_slice(&hasher.finalize().to_le_bytes());

        for value in &self.vectors {
            blob.extend_from_slice(&value.to_le_bytes());
        }
        write_atomically(path, &blob)?;

        let sidecar = IndexSidecar {
            dimension: self.dimension,
            count: self.len(),
            doc_ids: self.doc_ids.clone(),
        };
        let json = serde_json::to_vec_pretty(&sidecar)?;
        write_atomically(&sidecar_path(path), &json)?;

        log::info!(
            "saved vector index: {} documents, dimension {}, {:?}",
            self.len(),
            self.dimension,
            path
        );
        Ok(())
    }

    /// Restore an index persisted with [`VectorIndex::save`].
    ///
    /// Search on the loaded index is bit-for-bit equivalent to search on
    /// the index before saving.
    pub fn load(path: &Path) -> Result<Self> {
        let blob = fs::read(path).map_err(|e| {
            LoupeError::index_corrupt(format!("cannot read vector blob {path:?}: {e}"))
        })?;
        if blob.len() < HEADER_LEN {
            return Err(LoupeError::index_corrupt("vector blob header truncated"));
        }

        let (header, body) = blob.split_at(HEADER_LEN);
        if header[0..4] != INDEX_MAGIC {
            return Err(LoupeError::index_corrupt("bad vector blob magic"));
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != INDEX_VERSION {
            return Err(LoupeError::index_corrupt(format!(
                "unsupported index version: {version}"
            )));
        }
        let dimension = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
        let count = u32::from_le_bytes([header[10], header[11], header[12], header[13]]) as usize;

        let crc_expected =
            u32::from_le_bytes([header[14], header[15], header[16], header[17]]);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header[..HEADER_LEN - 4]);
        let crc_actual = hasher.finalize();
        if crc_actual != crc_expected {
            return Err(LoupeError::index_corrupt(format!(
                "header CRC mismatch (expected {crc_expected:#010x}, got {crc_actual:#010x})"
            )));
        }

        let expected_body = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| LoupeError::index_corrupt("vector blob size overflow"))?;
        if body.len() != expected_body {
            return Err(LoupeError::index_corrupt(format!(
                "vector blob size mismatch: expected {expected_body} bytes, got {}",
                body.len()
            )));
        }

        let mut vectors = Vec::with_capacity(count * dimension);
        for chunk in body.chunks_exact(4) {
            vectors.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }

        let sidecar_path = sidecar_path(path);
        let sidecar_json = fs::read_to_string(&sidecar_path).map_err(|e| {
            LoupeError::index_corrupt(format!("cannot read sidecar {sidecar_path:?}: {e}"))
        })?;
        let sidecar: IndexSidecar = serde_json::from_str(&sidecar_json)
            .map_err(|e| LoupeError::index_corrupt(format!("cannot parse sidecar: {e}")))?;

        if sidecar.count != count
            || sidecar.dimension != dimension
            || sidecar.doc_ids.len() != count
        {
            return Err(LoupeError::index_corrupt(format!(
                "sidecar disagrees with blob: sidecar count {} / dimension {} / {} ids, \
                 blob count {count} / dimension {dimension}",
                sidecar.count,
                sidecar.dimension,
                sidecar.doc_ids.len()
            )));
        }

        Ok(Self {
            dimension,
            vectors,
            doc_ids: sidecar.doc_ids,
        })
    }
}

/// Path of the JSON sidecar co-located with the vector blob.
pub fn sidecar_path(blob_path: &Path) -> PathBuf {
    let mut os = blob_path.as_os_str().to_owned();
    os.push(".meta.json");
    PathBuf::from(os)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(
            vec![
                Vector::new(vec![1.0, 0.0]),
                Vector::new(vec![0.0, 1.0]),
                Vector::new(vec![0.7, 0.7]),
            ],
            vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_build_alignment_invariant() {
        let index = sample_index();
        assert_eq!(index.len(), index.doc_ids().len());
        assert_eq!(index.dimension(), 2);
    }

    #[test]
    fn test_build_rejects_misaligned_inputs() {
        let result = VectorIndex::build(
            vec![Vector::new(vec![1.0, 0.0])],
            vec!["a.txt".to_string(), "b.txt".to_string()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_inconsistent_dimensions() {
        let result = VectorIndex::build(
            vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0])],
            vec!["a.txt".to_string(), "b.txt".to_string()],
        );
        assert!(matches!(
            result,
            Err(LoupeError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_doc_ids() {
        let result = VectorIndex::build(
            vec![Vector::new(vec![1.0]), Vector::new(vec![2.0])],
            vec!["a.txt".to_string(), "a.txt".to_string()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_search_ranks_by_cosine_similarity() {
        let index = sample_index();
        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 3).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].doc_id, "a.txt");
        assert!((hits[0].score - 1.0).abs() < 1e-3);
        assert_eq!(hits[1].doc_id, "c.txt");
        assert!((hits[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert_eq!(hits[2].doc_id, "b.txt");
        assert!(hits[2].score.abs() < 1e-3);
    }

    #[test]
    fn test_search_truncates_to_corpus_size() {
        let index = sample_index();
        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_search_k_zero_is_empty() {
        let index = sample_index();
        assert!(index.search(&Vector::new(vec![1.0, 0.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_validates_query_dimension() {
        let index = sample_index();
        let result = index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 3);
        assert!(matches!(result, Err(LoupeError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_search_tie_break_is_ascending_doc_id() {
        let index = VectorIndex::build(
            vec![
                Vector::new(vec![1.0, 0.0]),
                Vector::new(vec![1.0, 0.0]),
                Vector::new(vec![1.0, 0.0]),
            ],
            vec!["c.txt".to_string(), "a.txt".to_string(), "b.txt".to_string()],
        )
        .unwrap();

        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "b.txt", "c.txt"]);

        // Deterministic across repeated calls.
        let again = index.search(&Vector::new(vec![1.0, 0.0]), 3).unwrap();
        assert_eq!(hits, again);
    }

    #[test]
    fn test_save_load_roundtrip_search_equivalence() -> Result<()> {
        let index = sample_index();
        let dir = tempdir()?;
        let path = dir.path().join("vector.lvx");
        index.save(&path)?;

        let loaded = VectorIndex::load(&path)?;
        assert_eq!(loaded.len(), index.len());
        assert_eq!(loaded.doc_ids(), index.doc_ids());

        let query = Vector::new(vec![0.3, -0.9]);
        assert_eq!(index.search(&query, 3)?, loaded.search(&query, 3)?);
        Ok(())
    }

    #[test]
    fn test_load_missing_sidecar_is_corrupt() -> Result<()> {
        let index = sample_index();
        let dir = tempdir()?;
        let path = dir.path().join("vector.lvx");
        index.save(&path)?;
        fs::remove_file(sidecar_path(&path))?;

        assert!(matches!(
            VectorIndex::load(&path),
            Err(LoupeError::IndexCorrupt(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_sidecar_count_mismatch_is_corrupt() -> Result<()> {
        let index = sample_index();
        let dir = tempdir()?;
        let path = dir.path().join("vector.lvx");
        index.save(&path)?;

        let sidecar = sidecar_path(&path);
        let json = fs::read_to_string(&sidecar)?;
        let truncated = json.replacen("\"count\": 3", "\"count\": 2", 1);
        fs::write(&sidecar, truncated)?;

        assert!(matches!(
            VectorIndex::load(&path),
            Err(LoupeError::IndexCorrupt(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_corrupted_header_is_detected() -> Result<()> {
        let index = sample_index();
        let dir = tempdir()?;
        let path = dir.path().join("vector.lvx");
        index.save(&path)?;

        let mut blob = fs::read(&path)?;
        blob[6] ^= 0xFF; // flip a dimension byte, CRC must catch it
        fs::write(&path, blob)?;

        assert!(matches!(
            VectorIndex::load(&path),
            Err(LoupeError::IndexCorrupt(_))
        ));
        Ok(())
    }

    #[test]
    fn test_empty_index_search_is_empty() {
        let index = VectorIndex::build(Vec::new(), Vec::new()).unwrap();
        assert!(index.is_empty());
        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 5).unwrap();
        assert!(hits.is_empty());
    }
}
