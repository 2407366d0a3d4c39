use crate::types::{DecodeFailure, LanguageKind, SourceFile};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Immutable copy of a scanned source set.
///
/// Everything downstream reads from here; nothing re-reads the disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: PathBuf,
    /// Language kind every file in the set belongs to.
    pub kind: LanguageKind,
    /// Stable listing order: primary, then extra files, then secondary.
    pub files: Vec<SourceFile>,
    /// Files that matched but could not be read.
    pub unreadable: Vec<DecodeFailure>,
}

impl Snapshot {
    pub fn new(root: PathBuf, kind: LanguageKind) -> Self {
        Self {
            root,
            kind,
            files: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Looks a file up by relative path, ignoring case.
    pub fn find(&self, relative_path: &str) -> Option<&SourceFile> {
        self.files
            .iter()
            .find(|f| f.relative_path.eq_ignore_ascii_case(relative_path))
    }

    pub fn find_mut(&mut self, relative_path: &str) -> Option<&mut SourceFile> {
        self.files
            .iter_mut()
            .find(|f| f.relative_path.eq_ignore_ascii_case(relative_path))
    }

    /// Short content digest over listing order, relative paths and bytes.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.relative_path.as_bytes());
            hasher.update([0u8]);
            hasher.update((file.bytes.len() as u64).to_le_bytes());
            hasher.update(&file.bytes);
        }
        format!("{:x}", hasher.finalize())[..16].to_string()
    }
}
