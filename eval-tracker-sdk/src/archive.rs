//! Directory packing for artifact uploads
//!
//! A directory is walked in file-name order and written into a gzipped tar
//! with paths relative to its root, so packing the same tree twice yields the
//! same manifest.

use crate::error::{SdkError, SdkResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// A packed directory ready for upload
#[derive(Debug, Clone)]
pub struct PackedDirectory {
    /// Gzipped tar bytes
    pub bytes: Vec<u8>,
    /// sha256 of `bytes`, hex encoded
    pub digest: String,
    /// Regular files included, in archive order
    pub files: Vec<ManifestEntry>,
}

impl PackedDirectory {
    /// Total size of the packed files before compression
    pub fn content_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// One file in a packed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Path relative to the packed root, `/`-separated
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// sha256 of the contents, hex encoded
    pub sha256: String,
}

/// Pack every regular file under `dir`
pub fn pack_directory(dir: &Path) -> SdkResult<PackedDirectory> {
    if !dir.is_dir() {
        return Err(SdkError::Archive {
            dir: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| SdkError::Archive {
                dir: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let contents = fs::read(entry.path())?;
        files.push(ManifestEntry {
            path: name.clone(),
            size: contents.len() as u64,
            sha256: hex::encode(Sha256::digest(&contents)),
        });
        builder.append_path_with_name(entry.path(), &name)?;
    }

    let bytes = builder.into_inner()?.finish()?;
    let digest = hex::encode(Sha256::digest(&bytes));

    debug!(
        "Packed {} files from {} into {} bytes",
        files.len(),
        dir.display(),
        bytes.len()
    );

    Ok(PackedDirectory {
        bytes,
        digest,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_pack_directory_manifest_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.json"), b"{}").unwrap();
        fs::write(dir.path().join("a.json"), b"{\"x\": 1}").unwrap();
        fs::write(dir.path().join("nested/c.txt"), b"hello").unwrap();

        let packed = pack_directory(dir.path()).unwrap();

        let paths: Vec<_> = packed.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.json", "b.json", "nested/c.txt"]);
        assert_eq!(packed.content_size(), 8 + 2 + 5);
        assert_eq!(packed.digest, hex::encode(Sha256::digest(&packed.bytes)));

        let mut archive = tar::Archive::new(GzDecoder::new(packed.bytes.as_slice()));
        let mut names = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let mut body = String::new();
            entry.read_to_string(&mut body).unwrap();
            names.push((entry.path().unwrap().display().to_string(), body));
        }
        assert_eq!(names[2], ("nested/c.txt".to_string(), "hello".to_string()));
    }

    #[test]
    fn test_empty_directory_packs_to_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let packed = pack_directory(dir.path()).unwrap();
        assert!(packed.files.is_empty());
        assert!(!packed.bytes.is_empty());
    }

    #[test]
    fn test_missing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = pack_directory(&dir.path().join("absent"));
        assert!(matches!(result, Err(SdkError::Archive { .. })));
    }
}
