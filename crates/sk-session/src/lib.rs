pub mod clock;
pub mod dispatch;
pub mod id;
pub mod latency;
pub mod session;
pub mod timeout;

pub use clock::{ClockSync, SYNC_INTERVAL_MS};
pub use dispatch::{DispatchTable, PacketError, RequiredStatus};
pub use id::{SessionId, SessionIdGenerator};
pub use latency::LatencyTracker;
pub use session::{Capabilities, Session, SessionStatus};
pub use timeout::SessionTimeout;
