use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequiredStatus {
    Authed,
    LoggedIn,
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("handler for opcode {opcode} failed: {reason}")]
    HandlerFailed { opcode: u16, reason: String },
}

type Handler<S> = Box<dyn Fn(&mut S, &[u8]) -> Result<(), PacketError> + Send + Sync>;

struct DispatchEntry<S> {
    required: RequiredStatus,
    handler: Handler<S>,
}

/// Static opcode -> (required status, handler) table. Opcodes gated by a
/// status the session hasn't reached are dropped silently; handler errors
/// are logged and the packet skipped.
pub struct DispatchTable<S> {
    entries: FxHashMap<u16, DispatchEntry<S>>,
}

impl<S> Default for DispatchTable<S> {
    fn default() -> Self {
        Self { entries: FxHashMap::default() }
    }
}

impl<S> DispatchTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, opcode: u16, required: RequiredStatus, handler: impl Fn(&mut S, &[u8]) -> Result<(), PacketError> + Send + Sync + 'static) {
        self.entries.insert(opcode, DispatchEntry { required, handler: Box::new(handler) });
    }

    /// Dispatches `body` for `opcode` if `current_status` satisfies the
    /// entry's requirement. Returns `Ok(false)` for an unknown opcode or an
    /// unmet status (both silent drops), `Ok(true)` on a successful
    /// dispatch, and the handler's error otherwise.
    pub fn dispatch(&self, opcode: u16, current_status: RequiredStatus, session: &mut S, body: &[u8]) -> Result<bool, PacketError> {
        let Some(entry) = self.entries.get(&opcode) else {
            return Ok(false);
        };
        if current_status < entry.required {
            return Ok(false);
        }
        (entry.handler)(session, body).map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmet_status_is_silently_dropped() {
        let mut table: DispatchTable<u32> = DispatchTable::new();
        table.register(1, RequiredStatus::LoggedIn, |_, _| Ok(()));
        let mut session = 0u32;
        let dispatched = table.dispatch(1, RequiredStatus::Authed, &mut session, &[]).unwrap();
        assert!(!dispatched);
    }

    #[test]
    fn unknown_opcode_is_silently_dropped() {
        let table: DispatchTable<u32> = DispatchTable::new();
        let mut session = 0u32;
        assert!(!table.dispatch(99, RequiredStatus::LoggedIn, &mut session, &[]).unwrap());
    }

    #[test]
    fn matching_status_dispatches() {
        let mut table: DispatchTable<u32> = DispatchTable::new();
        table.register(1, RequiredStatus::Authed, |session, _| {
            *session += 1;
            Ok(())
        });
        let mut session = 0u32;
        assert!(table.dispatch(1, RequiredStatus::LoggedIn, &mut session, &[]).unwrap());
        assert_eq!(session, 1);
    }
}
