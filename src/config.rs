//! `buildorder.toml`: optional per-project settings.
//!
//! ```toml
//! [scan]
//! language = "fortran"
//! include_subdirs = true
//! exclude = ["parallel", "serial"]
//!
//! [[patch_set]]
//! target = "mt3dms"
//! version = 1
//!
//! [[patch_set.patch]]
//! file = "mt3dms5.for"
//! action = "replace"
//! find = "CALL GETCL(FLNAME)"
//! with = "CALL GETARG(1,FLNAME)"
//! ```

use crate::error::ConfigError;
use crate::patch::PatchSet;
use crate::scan::ScanOptions;
use crate::types::LanguageKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "buildorder.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    #[serde(rename = "patch_set")]
    pub patch_sets: Vec<PatchSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    Fortran,
    C,
}

impl SourceLanguage {
    pub fn kind(&self) -> LanguageKind {
        match self {
            SourceLanguage::Fortran => LanguageKind::ModuleBased,
            SourceLanguage::C => LanguageKind::HeaderBased,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub language: SourceLanguage,
    pub include_subdirs: bool,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
    /// Relative paths resolve against the config file's directory.
    pub secondary_dir: Option<PathBuf>,
    pub extra_files: Vec<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            language: SourceLanguage::Fortran,
            include_subdirs: false,
            respect_gitignore: true,
            exclude: Vec::new(),
            secondary_dir: None,
            extra_files: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.scan.resolve_paths(base);
        }
        Ok(config)
    }

    /// Loads `buildorder.toml` from `root` when present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::debug!("using config {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

impl ScanConfig {
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(dir) = &self.secondary_dir {
            self.secondary_dir = Some(base.join(dir));
        }
        self.extra_files = self.extra_files.iter().map(|f| base.join(f)).collect();
    }

    pub fn to_options(&self, root: &Path) -> ScanOptions {
        let mut options = ScanOptions::new(root, self.language.kind());
        options.include_subdirs = self.include_subdirs;
        options.respect_gitignore = self.respect_gitignore;
        options.exclude = self.exclude.clone();
        options.secondary_dir = self.secondary_dir.clone();
        options.extra_files = self.extra_files.clone();
        options
    }
}
