use std::path::PathBuf;

use clap::Parser;

pub const BUILD: &str = "1";

/// Auth daemon CLI, including the auth-only reload flags.
#[derive(Parser, Debug)]
#[command(name = "authserver", about = "Skirmish auth daemon", disable_version_flag = true)]
pub struct Cli {
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[arg(short = 'c', long = "config", default_value = "authserver.conf")]
    pub config: PathBuf,

    #[arg(long = "stop")]
    pub stop: bool,

    #[arg(long = "reload-banned")]
    pub reload_banned: bool,

    #[arg(long = "reload-realm")]
    pub reload_realm: bool,
}
