use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SourceLanguage;

#[derive(Parser)]
#[command(name = "buildorder")]
#[command(about = "Compile order for Fortran and C source trees")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log scanning and resolution details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the compile order
    Order {
        #[command(flatten)]
        scan: ScanArgs,

        /// One path per line, without stage headers
        #[arg(long)]
        flat: bool,

        /// Emit the JSON document
        #[arg(long, conflicts_with = "flat")]
        json: bool,

        /// Include per-unit symbols in the JSON document
        #[arg(long, requires = "json")]
        units: bool,

        /// Exit non-zero on cycles, unresolved requirements or excluded files
        #[arg(long)]
        strict: bool,
    },

    /// List each unit with the symbols it defines and requires
    Units {
        #[command(flatten)]
        scan: ScanArgs,

        #[arg(long)]
        json: bool,
    },

    /// Write a markdown dependency report
    Report {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        strict: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Source directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Source language (overrides the config file)
    #[arg(short, long, value_enum)]
    pub lang: Option<SourceLanguage>,

    /// Descend into subdirectories
    #[arg(long)]
    pub subdirs: bool,

    /// Second directory that satisfies requirements, ordered last
    #[arg(long)]
    pub srcdir2: Option<PathBuf>,

    /// Extra source file (repeatable)
    #[arg(long = "extra")]
    pub extra: Vec<PathBuf>,

    /// Use only the --extra files; the source directory is not walked
    #[arg(long, requires = "extra")]
    pub only_extra: bool,

    /// Directory names to skip (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Scan files listed in .gitignore too
    #[arg(long)]
    pub no_gitignore: bool,

    /// Config file (defaults to buildorder.toml in the source directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Apply the patch set for this target before resolving
    #[arg(short, long)]
    pub target: Option<String>,
}
