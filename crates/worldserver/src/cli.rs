use std::path::PathBuf;

use clap::Parser;

pub const BUILD: &str = "1";

/// World daemon CLI. `--version` is hand-rolled rather than clap's
/// built-in flag so the output matches `"<Name> (Build <N>)"`.
#[derive(Parser, Debug)]
#[command(name = "worldserver", about = "Skirmish world daemon", disable_version_flag = true)]
pub struct Cli {
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[arg(short = 'c', long = "config", default_value = "worldserver.conf")]
    pub config: PathBuf,

    #[arg(long = "stop")]
    pub stop: bool,
}
