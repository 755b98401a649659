use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "content-ledger")]
#[command(about = "Keeps a content-addressed inventory of a folder and reports duplicates", long_about = None)]
pub struct Cli {
    /// Folder to inventory, overriding the configured root
    #[arg(long, global = true)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one scan cycle and update the store (default)
    Scan,
    /// Keep scanning on a fixed interval
    Watch(WatchArgs),
    /// Report duplicate files and cleanup suggestions
    Duplicates(DuplicatesArgs),
    /// Collapse duplicate rows in the existing store
    CleanStore,
    /// Run file type and size analysis on the stored inventory
    Analyze,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between cycles
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long)]
    pub cycles: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    /// Use the stored inventory as-is instead of scanning the folder
    #[arg(long)]
    pub stored: bool,

    /// Number of groups to list
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}
