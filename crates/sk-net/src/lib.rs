//! Accept loop, reactor pool, and framed-socket plumbing shared by the
//! world, auth, and time-sync daemons.

mod manager;
mod reactor;
mod socket;

pub use manager::{SocketManager, SocketOptions};
pub use reactor::{Reactor, ReactorHandle, REACTOR_TICK};
pub use socket::{FramedSocket, SocketCloseReason, SocketId};
pub use sk_protocol::{DecodeError, Frame, MAX_BODY_LEN};
