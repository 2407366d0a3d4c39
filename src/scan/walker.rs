use crate::error::ScanError;
use crate::scan::filter::{is_excluded_dir, should_include_file};
use crate::scan::Snapshot;
use crate::types::{DecodeFailure, Language, LanguageKind, Origin, SourceFile};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// What to scan and how.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Base for relative paths; walked unless `walk_root` is off.
    pub root: PathBuf,
    pub kind: LanguageKind,
    pub walk_root: bool,
    /// Descend into subdirectories of `root` (and of `secondary_dir`).
    pub include_subdirs: bool,
    pub respect_gitignore: bool,
    /// Directory names pruned from the walk.
    pub exclude: Vec<String>,
    /// Resolves requirements of the primary set; ordered after it.
    pub secondary_dir: Option<PathBuf>,
    /// Listed after the primary directory's files.
    pub extra_files: Vec<PathBuf>,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>, kind: LanguageKind) -> Self {
        Self {
            root: root.into(),
            kind,
            walk_root: true,
            include_subdirs: false,
            respect_gitignore: true,
            exclude: Vec::new(),
            secondary_dir: None,
            extra_files: Vec::new(),
        }
    }

    /// Exactly `files`, with paths reported relative to `root`.
    pub fn from_files(root: impl Into<PathBuf>, kind: LanguageKind, files: Vec<PathBuf>) -> Self {
        Self {
            walk_root: false,
            extra_files: files,
            ..Self::new(root, kind)
        }
    }
}

/// Reads every matching source file into a [`Snapshot`].
pub fn scan(options: &ScanOptions) -> Result<Snapshot, ScanError> {
    let root = canonical_dir(&options.root)?;
    let mut snapshot = Snapshot::new(root.clone(), options.kind);
    let mut seen = HashSet::new();

    if options.walk_root {
        let primary = walk_directory(&root, options)?;
        read_into(&mut snapshot, &mut seen, primary, Origin::Primary);
    }

    let mut extras = Vec::new();
    for extra in &options.extra_files {
        let path = extra
            .canonicalize()
            .map_err(|_| ScanError::MissingFile(extra.clone()))?;
        if should_include_file(&path, options.kind).is_none() {
            log::warn!(
                "ignoring extra file {}: not a {} source",
                path.display(),
                options.kind
            );
            continue;
        }
        let relative = relative_to(&path, &root);
        extras.push((path, relative));
    }
    read_into(&mut snapshot, &mut seen, extras, Origin::Extra);

    if let Some(dir) = &options.secondary_dir {
        let secondary = canonical_dir(dir)?;
        let listed = walk_directory(&secondary, options)?;
        read_into(&mut snapshot, &mut seen, listed, Origin::Secondary);
    }

    log::debug!(
        "scanned {}: {} file(s), {} unreadable",
        root.display(),
        snapshot.files.len(),
        snapshot.unreadable.len()
    );

    Ok(snapshot)
}

fn canonical_dir(dir: &Path) -> Result<PathBuf, ScanError> {
    if !dir.exists() {
        return Err(ScanError::MissingDirectory(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }
    dir.canonicalize().map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Matching files under `dir` as (absolute path, relative path), sorted by relative path.
fn walk_directory(dir: &Path, options: &ScanOptions) -> Result<Vec<(PathBuf, String)>, ScanError> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(true)
        .parents(false)
        .require_git(false)
        .git_global(false)
        .ignore(options.respect_gitignore)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b));

    if !options.include_subdirs {
        builder.max_depth(Some(1));
    }

    let exclude = options.exclude.clone();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if entry.depth() == 0 || !is_dir {
            return true;
        }
        entry
            .file_name()
            .to_str()
            .map_or(true, |name| !is_excluded_dir(name, &exclude))
    });

    let mut found = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if should_include_file(path, options.kind).is_none() {
            continue;
        }
        found.push((path.to_path_buf(), relative_to(path, dir)));
    }

    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}

fn read_into(
    snapshot: &mut Snapshot,
    seen: &mut HashSet<PathBuf>,
    listed: Vec<(PathBuf, String)>,
    origin: Origin,
) {
    for (path, relative_path) in listed {
        if !seen.insert(path.clone()) {
            continue;
        }
        let Some(language) = Language::from_path(&path) else {
            continue;
        };
        match fs::read(&path) {
            Ok(bytes) => snapshot.files.push(SourceFile::new(
                path,
                relative_path,
                language,
                origin,
                bytes,
            )),
            Err(err) => {
                log::warn!("cannot read {}: {}", path.display(), err);
                snapshot.unreadable.push(DecodeFailure {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// `path` relative to `base` with `/` separators, or the full path when outside it.
fn relative_to(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}
