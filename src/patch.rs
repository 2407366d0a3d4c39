//! Declarative source fix-ups applied to a snapshot before analysis.
//!
//! A patch set belongs to one build target and carries a version so that a
//! changed fix-up is distinguishable in logs. Files on disk are never touched.

use crate::error::PatchError;
use crate::scan::{should_include_file, Snapshot};
use crate::types::{Origin, SourceFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PatchSet {
    pub target: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, rename = "patch")]
    pub patches: Vec<Patch>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Patch {
    /// Relative path inside the snapshot, matched ignoring case.
    pub file: String,
    #[serde(flatten)]
    pub action: PatchAction,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PatchAction {
    /// Replace every occurrence of `find`.
    Replace { find: String, with: String },
    /// Remove lines containing the text.
    DropLines { containing: String },
    /// Replace the whole file, creating it when absent.
    Write { contents: String },
}

/// Which patch set applies to `target`, if any.
pub fn select<'a>(sets: &'a [PatchSet], target: &str) -> Option<&'a PatchSet> {
    sets.iter().find(|s| s.target.eq_ignore_ascii_case(target))
}

/// Returns a patched copy of `snapshot`.
pub fn apply(snapshot: &Snapshot, set: &PatchSet) -> Result<Snapshot, PatchError> {
    let mut patched = snapshot.clone();

    for patch in &set.patches {
        match &patch.action {
            PatchAction::Write { contents } => write_file(&mut patched, patch, contents),
            PatchAction::Replace { find, with } => {
                let file = target_file(&mut patched, set, patch)?;
                let text = file_text(file, set, patch)?;
                if !text.contains(find.as_str()) {
                    return Err(PatchError::PatternNotFound {
                        target: set.target.clone(),
                        version: set.version,
                        file: patch.file.clone(),
                        find: find.clone(),
                    });
                }
                file.bytes = text.replace(find.as_str(), with).into_bytes();
            }
            PatchAction::DropLines { containing } => {
                let file = target_file(&mut patched, set, patch)?;
                let text = file_text(file, set, patch)?;
                let kept: Vec<&str> = text
                    .split_inclusive('\n')
                    .filter(|line| !line.contains(containing.as_str()))
                    .collect();
                file.bytes = kept.concat().into_bytes();
            }
        }
        log::debug!("{} v{}: patched {}", set.target, set.version, patch.file);
    }

    log::info!(
        "applied patch set {} v{} ({} patch(es))",
        set.target,
        set.version,
        set.patches.len()
    );
    Ok(patched)
}

fn target_file<'a>(
    snapshot: &'a mut Snapshot,
    set: &PatchSet,
    patch: &Patch,
) -> Result<&'a mut SourceFile, PatchError> {
    snapshot
        .find_mut(&patch.file)
        .ok_or_else(|| PatchError::MissingFile {
            target: set.target.clone(),
            version: set.version,
            file: patch.file.clone(),
        })
}

fn file_text(file: &SourceFile, set: &PatchSet, patch: &Patch) -> Result<String, PatchError> {
    String::from_utf8(file.bytes.clone()).map_err(|_| PatchError::NotText {
        target: set.target.clone(),
        version: set.version,
        file: patch.file.clone(),
    })
}

fn write_file(snapshot: &mut Snapshot, patch: &Patch, contents: &str) {
    if let Some(file) = snapshot.find_mut(&patch.file) {
        file.bytes = contents.as_bytes().to_vec();
        return;
    }

    let path = snapshot.root.join(&patch.file);
    // non-source files (e.g. include fragments) are written for the build step only
    let Some(language) = should_include_file(&path, snapshot.kind) else {
        log::debug!(
            "{} is not a {} source, not added to the snapshot",
            patch.file,
            snapshot.kind
        );
        return;
    };
    snapshot.files.push(SourceFile::new(
        path,
        patch.file.clone(),
        language,
        Origin::Primary,
        contents.as_bytes().to_vec(),
    ));
}
