use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flowerpress",
    about = "Flowerpress: Markdown documents and assets per space",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Storage root (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Save a Markdown file as a document body
    Save(SaveArgs),
    /// Print a document body
    Cat(DocArgs),
    /// Upload an asset for a document
    Upload(UploadArgs),
    /// List a document's assets
    Assets(DocArgs),
    /// Index the documents found on disk for a space
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Keep everything in memory instead of on disk
    #[arg(long)]
    pub memory: bool,
}

#[derive(Args)]
pub struct DocArgs {
    pub space: String,
    pub slug: String,
}

#[derive(Args)]
pub struct SaveArgs {
    pub space: String,
    pub slug: String,
    pub file: PathBuf,
    /// Only save if the stored body still has this etag
    #[arg(long)]
    pub if_etag: Option<String>,
}

#[derive(Args)]
pub struct UploadArgs {
    pub space: String,
    pub slug: String,
    pub file: PathBuf,
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct ScanArgs {
    pub space: String,
}
