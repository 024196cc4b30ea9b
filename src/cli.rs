use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Format: usda 1.0\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// ASCII USD scene writer
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable logging to file (default: aud.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", global = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Writer configuration file (overrides AUD_CONFIG and default locations)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the built-in reference scene
    Sample {
        /// Output file (extension is forced to .usda)
        #[arg(short = 'o', long = "output", value_name = "OUT", default_value = "sample.usda")]
        output: PathBuf,
    },

    /// Convert a JSON scene description to usda
    Convert {
        /// Scene description (JSON)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,

        /// Output file, or - for stdout (default: SCENE with .usda extension)
        #[arg(short = 'o', long = "output", value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// List built-in prim types, or the defaults declared for one type
    Schema {
        #[arg(value_name = "TYPE")]
        type_tag: Option<String>,
    },
}
