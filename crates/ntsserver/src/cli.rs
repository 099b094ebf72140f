use std::path::PathBuf;

use clap::Parser;

pub const BUILD: &str = "1";

/// Network time-sync daemon CLI. No reload flags; those are
/// auth-only.
#[derive(Parser, Debug)]
#[command(name = "ntsserver", about = "Skirmish network time-sync daemon", disable_version_flag = true)]
pub struct Cli {
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[arg(short = 'c', long = "config", default_value = "ntsserver.conf")]
    pub config: PathBuf,

    #[arg(long = "stop")]
    pub stop: bool,
}
