//! Typed view over the INI configuration file consumed by all three
//! daemons. Parsing itself is an external collaborator; this crate's only
//! job is turning parsed key/value pairs into the typed [`Config`] the
//! core uses, with the documented defaults.

use std::net::IpAddr;
use std::path::Path;

use ini::Ini;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: ini::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which daemon is loading the config, for picking the right default port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonKind {
    World,
    Auth,
    Nts,
}

impl DaemonKind {
    fn default_port(self) -> u16 {
        match self {
            DaemonKind::World => 18402,
            DaemonKind::Auth => 18401,
            DaemonKind::Nts => 18123,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DaemonKind::World => "worldserver",
            DaemonKind::Auth => "authserver",
            DaemonKind::Nts => "ntsserver",
        }
    }
}

/// Typed configuration, with every key resolved against its documented
/// default.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_port: u16,
    pub bind_ip: IpAddr,
    pub pid_file: String,
    pub thread_pool: usize,
    pub network_threads: usize,
    pub tcp_nodelay: bool,
    /// `None` means "use the OS default" (the source's `-1` sentinel).
    pub out_kbuff: Option<u32>,
    pub send_queue_limit: usize,
    pub session_timeout_ms: u64,
    pub expired_session_delay_ms: u64,
    pub queued_session_timeout_ms: u64,
    pub player_limit: usize,
    pub theater_deletion_delay_s: u64,
    pub wait_for_players_timeout_ms: u64,
    pub theater_update_threads: usize,
    pub world_update_interval_ms: u64,
    pub log_async_enable: bool,
}

impl Config {
    pub fn default_for(kind: DaemonKind) -> Self {
        Self {
            listen_port: kind.default_port(),
            bind_ip: "0.0.0.0".parse().expect("valid default"),
            pid_file: String::new(),
            thread_pool: 1,
            network_threads: 1,
            tcp_nodelay: false,
            out_kbuff: None,
            send_queue_limit: 0,
            session_timeout_ms: 60_000,
            expired_session_delay_ms: 5_000,
            queued_session_timeout_ms: 10_000,
            player_limit: 1000,
            theater_deletion_delay_s: 3600,
            wait_for_players_timeout_ms: 5_000,
            theater_update_threads: 1,
            world_update_interval_ms: 50,
            log_async_enable: false,
        }
    }

    pub fn load(kind: DaemonKind, path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut cfg = Self::default_for(kind);
        let section = ini.general_section();

        let port_key = match kind {
            DaemonKind::World => "WorldServerPort",
            DaemonKind::Auth => "AuthServerPort",
            DaemonKind::Nts => "NTSServerPort",
        };

        if let Some(v) = section.get(port_key) {
            cfg.listen_port = parse(port_key, v)?;
        }
        if let Some(v) = section.get("BindIP") {
            cfg.bind_ip = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "BindIP", value: v.to_owned() })?;
        }
        if let Some(v) = section.get("PidFile") {
            cfg.pid_file = v.to_owned();
        }
        if let Some(v) = section.get("ThreadPool") {
            cfg.thread_pool = parse("ThreadPool", v)?;
        }
        if let Some(v) = section.get("Network.Threads") {
            cfg.network_threads = parse("Network.Threads", v)?;
        }
        if let Some(v) = section.get("Network.TcpNoDelay") {
            cfg.tcp_nodelay = parse_bool("Network.TcpNoDelay", v)?;
        }
        if let Some(v) = section.get("Network.OutKBuff") {
            let raw: i64 = parse("Network.OutKBuff", v)?;
            cfg.out_kbuff = if raw < 0 { None } else { Some(raw as u32) };
        }
        if let Some(v) = section.get("Network.SendQueueLimit") {
            cfg.send_queue_limit = parse("Network.SendQueueLimit", v)?;
        }
        if let Some(v) = section.get("SessionTimeout") {
            cfg.session_timeout_ms = parse("SessionTimeout", v)?;
        }
        if let Some(v) = section.get("ExpiredSessionDelay") {
            cfg.expired_session_delay_ms = parse("ExpiredSessionDelay", v)?;
        }
        if let Some(v) = section.get("QueuedSessionTimeout") {
            cfg.queued_session_timeout_ms = parse("QueuedSessionTimeout", v)?;
        }
        if let Some(v) = section.get("PlayerLimit") {
            cfg.player_limit = parse("PlayerLimit", v)?;
        }
        if let Some(v) = section.get("TheaterDeletionDelay") {
            cfg.theater_deletion_delay_s = parse("TheaterDeletionDelay", v)?;
        }
        if let Some(v) = section.get("WaitForPlayersTimeout") {
            cfg.wait_for_players_timeout_ms = parse("WaitForPlayersTimeout", v)?;
        }
        if let Some(v) = section.get("TheaterUpdateThreads") {
            cfg.theater_update_threads = parse("TheaterUpdateThreads", v)?;
        }
        if let Some(v) = section.get("WorldUpdateInterval") {
            cfg.world_update_interval_ms = parse("WorldUpdateInterval", v)?;
        }
        if let Some(v) = section.get("Log.Async.Enable") {
            cfg.log_async_enable = parse_bool("Log.Async.Enable", v)?;
        }

        Ok(cfg)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: value.to_owned() })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_owned() }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = Config::default_for(DaemonKind::World);
        assert_eq!(cfg.listen_port, 18402);
        assert_eq!(cfg.session_timeout_ms, 60_000);
        assert_eq!(cfg.player_limit, 1000);
        assert_eq!(cfg.theater_deletion_delay_s, 3600);
        assert_eq!(cfg.out_kbuff, None);
    }

    #[test]
    fn overrides_apply() {
        let mut file = tempfile_with_contents(
            "WorldServerPort = 28402\nPlayerLimit = 50\nNetwork.TcpNoDelay = true\n\
             Network.OutKBuff = 65536\n",
        );
        let cfg = Config::load(DaemonKind::World, file.path()).unwrap();
        assert_eq!(cfg.listen_port, 28402);
        assert_eq!(cfg.player_limit, 50);
        assert!(cfg.tcp_nodelay);
        assert_eq!(cfg.out_kbuff, Some(65536));
        file.flush().unwrap();
    }

    fn tempfile_with_contents(contents: &str) -> NamedTempFileShim {
        let mut path = std::env::temp_dir();
        path.push(format!("sk-config-test-{}.conf", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        NamedTempFileShim { path }
    }

    struct NamedTempFileShim {
        path: std::path::PathBuf,
    }

    impl NamedTempFileShim {
        fn path(&self) -> &Path {
            &self.path
        }
        fn flush(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Drop for NamedTempFileShim {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
