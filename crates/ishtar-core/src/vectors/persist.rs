//! On-disk layout of a vector index
//!
//! Three artifacts per index base path:
//! - `<base>`: header (format version, backend, dimensions, row count)
//! - `<base>.meta.json`: sidecar with `ids`/`metas` in row order plus a
//!   SHA-256 of the vector file
//! - `<base>.vectors`: row-major little-endian f32 matrix
//!
//! Every artifact is written to a temporary file in the target directory and
//! renamed into place. A crash between renames leaves artifacts that disagree
//! on count or checksum, which `load` reports as corrupt.

use super::math::{bytes_to_embedding, embedding_to_bytes};
use super::{Metadata, VectorBackend};
use crate::error::{IshtarError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

const SIDECAR_SUFFIX: &str = ".meta.json";
const VECTORS_SUFFIX: &str = ".vectors";

#[derive(Debug, Serialize, Deserialize)]
struct IndexHeader {
    version: u32,
    backend: String,
    dimensions: usize,
    count: usize,
    written_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaSidecar {
    version: u32,
    dimensions: usize,
    count: usize,
    checksum: String,
    ids: Vec<String>,
    metas: Vec<Metadata>,
}

/// Rows restored from disk
#[derive(Debug)]
pub struct Snapshot {
    pub ids: Vec<String>,
    pub metas: Vec<Metadata>,
    pub vectors: Vec<f32>,
}

/// Paths of the three artifacts for an index base path
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub header: PathBuf,
    pub sidecar: PathBuf,
    pub vectors: PathBuf,
}

impl ArtifactPaths {
    pub fn new(base: &Path) -> Self {
        Self {
            header: base.to_path_buf(),
            sidecar: with_suffix(base, SIDECAR_SUFFIX),
            vectors: with_suffix(base, VECTORS_SUFFIX),
        }
    }

    /// Whether any artifact exists; a partial set still counts and is judged by `load`
    pub fn any_exists(&self) -> bool {
        self.header.exists() || self.sidecar.exists() || self.vectors.exists()
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn corrupt(path: &Path, what: impl std::fmt::Display) -> IshtarError {
    IshtarError::Persistence(format!("{}: {}", path.display(), what))
}

/// Write bytes to `path` via a temp file in the same directory and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| corrupt(path, format!("rename failed: {}", e.error)))?;
    Ok(())
}

/// Persist every row. Vectors first, sidecar second, header last.
pub fn save(
    base: &Path,
    backend: VectorBackend,
    dimensions: usize,
    ids: &[String],
    metas: &[Metadata],
    vectors: &[f32],
) -> Result<()> {
    let paths = ArtifactPaths::new(base);
    let count = ids.len();

    let vector_bytes = embedding_to_bytes(vectors);
    let sidecar = MetaSidecar {
        version: FORMAT_VERSION,
        dimensions,
        count,
        checksum: checksum(&vector_bytes),
        ids: ids.to_vec(),
        metas: metas.to_vec(),
    };
    let header = IndexHeader {
        version: FORMAT_VERSION,
        backend: backend.as_str().to_string(),
        dimensions,
        count,
        written_at: chrono::Utc::now().to_rfc3339(),
    };

    write_atomic(&paths.vectors, &vector_bytes)?;
    write_atomic(&paths.sidecar, &serde_json::to_vec(&sidecar)?)?;
    write_atomic(&paths.header, &serde_json::to_vec_pretty(&header)?)?;

    tracing::debug!("Persisted {} rows to {}", count, base.display());
    Ok(())
}

/// Load a persisted index.
///
/// Returns `Ok(None)` when nothing has been persisted at `base`, and a
/// `Persistence` error when artifacts exist but disagree with each other or
/// with the expected dimensionality.
pub fn load(base: &Path, dimensions: usize) -> Result<Option<Snapshot>> {
    let paths = ArtifactPaths::new(base);
    if !paths.any_exists() {
        return Ok(None);
    }

    let header_bytes =
        std::fs::read(&paths.header).map_err(|e| corrupt(&paths.header, e))?;
    let header: IndexHeader =
        serde_json::from_slice(&header_bytes).map_err(|e| corrupt(&paths.header, e))?;

    let sidecar_bytes =
        std::fs::read(&paths.sidecar).map_err(|e| corrupt(&paths.sidecar, e))?;
    let sidecar: MetaSidecar =
        serde_json::from_slice(&sidecar_bytes).map_err(|e| corrupt(&paths.sidecar, e))?;

    let vector_bytes =
        std::fs::read(&paths.vectors).map_err(|e| corrupt(&paths.vectors, e))?;

    if header.version != FORMAT_VERSION || sidecar.version != FORMAT_VERSION {
        return Err(corrupt(
            &paths.header,
            format!(
                "unsupported format version {}/{}",
                header.version, sidecar.version
            ),
        ));
    }
    if header.dimensions != dimensions || sidecar.dimensions != dimensions {
        return Err(corrupt(
            &paths.header,
            format!(
                "dimension mismatch: persisted {}, expected {}",
                header.dimensions, dimensions
            ),
        ));
    }
    if header.count != sidecar.count
        || sidecar.ids.len() != sidecar.count
        || sidecar.metas.len() != sidecar.count
    {
        return Err(corrupt(
            &paths.sidecar,
            format!(
                "row count disagreement: header {}, sidecar {}, ids {}, metas {}",
                header.count,
                sidecar.count,
                sidecar.ids.len(),
                sidecar.metas.len()
            ),
        ));
    }
    if vector_bytes.len() != sidecar.count * dimensions * 4 {
        return Err(corrupt(
            &paths.vectors,
            format!(
                "expected {} bytes, found {}",
                sidecar.count * dimensions * 4,
                vector_bytes.len()
            ),
        ));
    }
    if checksum(&vector_bytes) != sidecar.checksum {
        return Err(corrupt(&paths.vectors, "checksum mismatch"));
    }

    Ok(Some(Snapshot {
        ids: sidecar.ids,
        metas: sidecar.metas,
        vectors: bytes_to_embedding(&vector_bytes),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(title: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("title".to_string(), title.to_string());
        m
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("idx");
        let ids = vec!["a".to_string(), "b".to_string()];
        let metas = vec![meta("A"), meta("B")];
        let vectors = vec![1.0, 0.0, 0.0, 1.0];

        save(&base, VectorBackend::Flat, 2, &ids, &metas, &vectors).unwrap();
        let snapshot = load(&base, 2).unwrap().unwrap();

        assert_eq!(snapshot.ids, ids);
        assert_eq!(snapshot.metas, metas);
        assert_eq!(snapshot.vectors, vectors);
        assert!(temp.path().join("idx.meta.json").exists());
        assert!(temp.path().join("idx.vectors").exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(load(&temp.path().join("nothing"), 4).unwrap().is_none());
    }

    #[test]
    fn test_truncated_vectors_detected() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("idx");
        save(
            &base,
            VectorBackend::Flat,
            2,
            &["a".to_string()],
            &[meta("A")],
            &[1.0, 0.0],
        )
        .unwrap();
        std::fs::write(temp.path().join("idx.vectors"), [0u8; 3]).unwrap();

        let err = load(&base, 2).unwrap_err();
        assert!(matches!(err, IshtarError::Persistence(_)));
    }

    #[test]
    fn test_flipped_bytes_fail_checksum() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("idx");
        save(
            &base,
            VectorBackend::Flat,
            2,
            &["a".to_string()],
            &[meta("A")],
            &[1.0, 0.0],
        )
        .unwrap();
        std::fs::write(temp.path().join("idx.vectors"), embedding_to_bytes(&[0.0, 1.0]))
            .unwrap();

        let err = load(&base, 2).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_dimension_mismatch_detected() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("idx");
        save(
            &base,
            VectorBackend::Flat,
            2,
            &["a".to_string()],
            &[meta("A")],
            &[1.0, 0.0],
        )
        .unwrap();

        assert!(load(&base, 3).is_err());
    }

    #[test]
    fn test_missing_sidecar_detected() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("idx");
        save(
            &base,
            VectorBackend::Flat,
            2,
            &["a".to_string()],
            &[meta("A")],
            &[1.0, 0.0],
        )
        .unwrap();
        std::fs::remove_file(temp.path().join("idx.meta.json")).unwrap();

        assert!(load(&base, 2).is_err());
    }
}
