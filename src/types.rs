use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source languages recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    FortranFixed,
    FortranFree,
    C,
    Cpp,
    Header,
}

/// How a language expresses its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    /// Named modules declared in one file and imported by others (Fortran).
    ModuleBased,
    /// Files that pull other files in by name (C/C++ includes).
    HeaderBased,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "f" | "for" | "ftn" | "f77" | "fpp" => Some(Language::FortranFixed),
            "f90" | "f95" | "f03" | "f08" => Some(Language::FortranFree),
            "c" => Some(Language::C),
            "cc" | "cpp" | "cxx" => Some(Language::Cpp),
            "h" | "hh" | "hpp" | "hxx" => Some(Language::Header),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn kind(&self) -> LanguageKind {
        match self {
            Language::FortranFixed | Language::FortranFree => LanguageKind::ModuleBased,
            Language::C | Language::Cpp | Language::Header => LanguageKind::HeaderBased,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::FortranFixed => "fortran (fixed form)",
            Language::FortranFree => "fortran (free form)",
            Language::C => "c",
            Language::Cpp => "c++",
            Language::Header => "header",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageKind::ModuleBased => f.write_str("module-based"),
            LanguageKind::HeaderBased => f.write_str("header-based"),
        }
    }
}

/// A case-insensitive identifier, lower-cased on construction.
///
/// Fortran is case-insensitive and include targets are matched the same way,
/// so every symbol comparison in the crate goes through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolName(String);

impl SymbolName {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `stem` names the same thing, ignoring case.
    pub fn matches_stem(&self, stem: &str) -> bool {
        self.0 == stem.to_lowercase()
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SymbolName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Where a scanned file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The main source directory.
    Primary,
    /// Listed explicitly by the caller.
    Extra,
    /// The secondary directory: resolves requirements, ordered last.
    Secondary,
}

/// One file captured by a directory scan, before extraction.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: Language,
    pub origin: Origin,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(
        path: PathBuf,
        relative_path: String,
        language: Language,
        origin: Origin,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            path,
            relative_path,
            language,
            origin,
            bytes,
        }
    }
}

/// Symbols pulled out of one file's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// In declaration order, without duplicates.
    pub defines: Vec<SymbolName>,
    pub requires: BTreeSet<SymbolName>,
}

impl Extraction {
    pub fn define(&mut self, name: SymbolName) {
        if !self.defines.contains(&name) {
            self.defines.push(name);
        }
    }

    pub fn require(&mut self, name: SymbolName) {
        self.requires.insert(name);
    }
}

/// One compilation unit: a file and what it provides and consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: Language,
    pub origin: Origin,
    pub defines: Vec<SymbolName>,
    pub requires: BTreeSet<SymbolName>,
}

impl SourceUnit {
    pub fn kind(&self) -> LanguageKind {
        self.language.kind()
    }

    /// File name without its extension, e.g. `gwf2bas7` for `src/gwf2bas7.f`.
    pub fn file_stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    pub fn defines_symbol(&self, name: &SymbolName) -> bool {
        self.defines.contains(name)
    }
}

/// A unit that was left out of the graph because its bytes were not usable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    pub path: PathBuf,
    pub reason: String,
}
