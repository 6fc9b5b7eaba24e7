//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use linkfile_core::DeleteChoice;

/// Manage file attachments of bibliography entries.
///
/// Entries are read from and written back to JSON files.
#[derive(Parser, Debug)]
#[command(name = "linkfile")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an online attachment into the library and link the local copy
    Download(DownloadArgs),
    /// Remove an attachment from the entry, optionally deleting the file
    Delete(DeleteArgs),
    /// Move and rename an attachment to its generated location
    Normalize(TargetArgs),
    /// Show where an attachment resolves and whether it is normalized
    Check(TargetArgs),
    /// Print the file type registered for a MIME type or extension
    Classify(ClassifyArgs),
}

/// Selects one attachment of one entry and the library it belongs to.
#[derive(ClapArgs, Debug, Clone)]
pub struct TargetArgs {
    /// Entry JSON file
    pub entry: PathBuf,

    /// Attachment number, starting at 1
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub file: u16,

    #[command(flatten)]
    pub library: LibraryArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct LibraryArgs {
    /// Library (.bib) file the entry belongs to
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// File directory set in the library for the current user
    #[arg(long, value_name = "DIR")]
    pub user_file_directory: Option<PathBuf>,

    /// File directory set in the library for everyone
    #[arg(long, value_name = "DIR")]
    pub library_file_directory: Option<PathBuf>,

    /// Global attachment directory
    #[arg(long, value_name = "DIR")]
    pub main_file_directory: Option<PathBuf>,

    /// File name pattern, e.g. "[citationkey]"
    #[arg(long, value_name = "PATTERN")]
    pub file_name_pattern: Option<String>,

    /// Directory pattern, e.g. "[entrytype]"
    #[arg(long, value_name = "PATTERN")]
    pub file_directory_pattern: Option<String>,

    /// Do not use the library file's directory as a base directory
    #[arg(long)]
    pub not_relative_to_bib: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Answer the confirmation non-interactively (remove, delete or cancel)
    #[arg(long)]
    pub choice: Option<DeleteChoice>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ClassifyArgs {
    /// MIME type (e.g. "text/html; charset=UTF-8") or extension (e.g. "pdf")
    pub value: String,
}
