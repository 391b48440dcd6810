//! Command line interface definition
//!
//! The installer is interactive by design; the surface is two flags.

use clap::Parser;

/// romflash - interactive custom ROM installer
#[derive(Parser)]
#[command(name = "romflash")]
#[command(disable_version_flag = true)]
#[command(about = "Flash the latest custom ROM release onto your device")]
pub struct Cli {
    /// Print the program version and exit
    #[arg(long)]
    pub version: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}
