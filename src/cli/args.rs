//! CLI argument definitions using clap
//!
//! Commands:
//! - sharebox init --config <path>
//! - sharebox serve --config <path>
//! - sharebox list --config <path>
//! - sharebox encode <stored_name>
//! - sharebox decode <token>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sharebox - upload files, share them by link
#[derive(Parser, Debug)]
#[command(name = "sharebox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config if missing and create the storage directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./sharebox.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./sharebox.json")]
        config: PathBuf,
    },

    /// List stored files and their uploaders
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./sharebox.json")]
        config: PathBuf,
    },

    /// Print the share token for a stored name
    Encode {
        stored_name: String,
    },

    /// Print the stored name behind a share token
    Decode {
        token: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
