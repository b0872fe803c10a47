use crate::selection::Selection;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "climscen",
    about = "Browse climate-scenario artifact catalogs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file (defaults to ./climscen.ini)
    #[arg(long, global = true, conflicts_with = "data_dir")]
    pub config: Option<PathBuf>,

    /// Read a local data tree directly, without a config file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the projects under the data root
    Projects {
        /// Also load each project's settings
        #[arg(long, short = 'l')]
        long: bool,
    },

    /// List a project's artifacts matching a glob pattern
    Files {
        /// Project name
        project: String,

        /// Slash-separated glob, e.g. "map/*/2021-2050/*.csv" or "**/*.geojson"
        #[arg(default_value = "**")]
        pattern: String,
    },

    /// Show the legal values of every dimension for a selection
    Resolve {
        /// Project name
        project: String,

        #[command(flatten)]
        selection: Selection,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the artifact path a selection points at
    Path {
        /// Project name
        project: String,

        #[command(flatten)]
        selection: Selection,
    },
}
