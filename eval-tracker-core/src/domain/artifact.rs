use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The two directory snapshots uploaded alongside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    /// Raw harness JSON outputs.
    Result,
    /// Harness write-out (debug) text.
    Output,
}

impl BlobKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            BlobKind::Result => "result",
            BlobKind::Output => "output",
        }
    }

    /// Artifact type label the store groups versions by.
    pub fn type_label(&self) -> &'static str {
        match self {
            BlobKind::Result => "lm-evaluation-harness-result",
            BlobKind::Output => "lm-evaluation-harness-output",
        }
    }
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// `org/model` -> `org.model.result`
pub fn blob_name(target_model: &str, kind: BlobKind) -> String {
    format!("{}.{}", target_model.replace('/', "."), kind.suffix())
}

/// A directory to upload as one named, versioned blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobSpec {
    pub name: String,
    pub kind: BlobKind,
    pub source_dir: PathBuf,
}

impl BlobSpec {
    pub fn new(target_model: &str, kind: BlobKind, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: blob_name(target_model, kind),
            kind,
            source_dir: source_dir.into(),
        }
    }

    pub fn type_label(&self) -> &'static str {
        self.kind.type_label()
    }
}
