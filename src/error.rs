use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one scanned file into a unit. Never fatal to a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{path}: not valid UTF-8 text ({source})")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("extra file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("failed to resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch set {target} v{version}: no file matching {file}")]
    MissingFile {
        target: String,
        version: u32,
        file: String,
    },

    #[error("patch set {target} v{version}: {file} does not contain {find:?}")]
    PatternNotFound {
        target: String,
        version: u32,
        file: String,
        find: String,
    },

    #[error("patch set {target} v{version}: {file} is not valid UTF-8 text")]
    NotText {
        target: String,
        version: u32,
        file: String,
    },
}
