use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "qc-merge",
    version,
    about = "Collects per-recording quality control documents and figures into one result set"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Merge(MergeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Directory holding quality_control_{recording}.json files and their
    /// quality_control_{recording}/ figure directories.
    #[arg(long, default_value = "../data")]
    pub data_dir: PathBuf,

    /// Directory receiving quality_control.json and quality_control/{recording}/.
    #[arg(long, default_value = "../results")]
    pub results_dir: PathBuf,
}
