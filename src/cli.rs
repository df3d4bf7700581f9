use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "srd-extract",
    version,
    about = "Extract SRD reference data from HTML documents into sqlite tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Extract(ExtractArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "SRD-html")]
    pub html_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "SRD-html")]
    pub html_dir: PathBuf,

    #[arg(long, default_value = "dnd35.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,

    /// Restrict the run to the named tables.
    #[arg(long = "table")]
    pub tables: Vec<String>,

    /// Reject text values containing a single quote.
    #[arg(long, default_value_t = false)]
    pub strict_text: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "SRD-html")]
    pub html_dir: PathBuf,

    #[arg(long, default_value = "dnd35.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,
}
