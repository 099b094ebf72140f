//! Process lifecycle plumbing shared by the three daemons: single-instance
//! PID-file enforcement, a control-channel IPC substrate for the CLI's
//! `--stop`/`--reload-*` flags, and signal-driven graceful shutdown.

mod control;
mod pidfile;
mod signal;

pub use control::{socket_path, send_message, ControlListener, IpcMessage};
pub use pidfile::{PidFile, PidFileError};
pub use signal::shutdown_signal;
