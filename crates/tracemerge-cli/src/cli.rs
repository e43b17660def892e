use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracemerge_merge::QuickMerge;

#[derive(Parser)]
#[command(
    name = "tracemerge",
    about = "Detect and resolve duplicate traces in a serial-section series",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Categorize every section and report conflicts
    Inspect(InspectArgs),
    /// Resolve conflicts with a policy and write the merged series
    Merge(MergeArgs),
}

/// Options shared by commands that open a merge session.
#[derive(Args)]
pub struct SessionArgs {
    /// Source series document
    pub series: PathBuf,
    /// TOML merge configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Union-over-intersection threshold (overrides the config file)
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Directory receiving the merged series
    pub output_dir: PathBuf,
    #[arg(long, default_value = "source")]
    pub policy: MergePolicy,
    /// Indent the written document
    #[arg(long)]
    pub pretty: bool,
}

/// How `merge` settles potential duplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum MergePolicy {
    /// Keep the first trace of each pair
    First,
    /// Keep the second trace of each pair
    Second,
    /// Keep both traces of each pair
    Both,
    /// Leave conflicted sections as they are in the source
    Source,
}

impl MergePolicy {
    pub fn quick_merge(self) -> Option<QuickMerge> {
        match self {
            MergePolicy::First => Some(QuickMerge::First),
            MergePolicy::Second => Some(QuickMerge::Second),
            MergePolicy::Both => Some(QuickMerge::Both),
            MergePolicy::Source => None,
        }
    }
}
