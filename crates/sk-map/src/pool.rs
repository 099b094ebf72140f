use sk_entity::{Item, Projectile, Robot};

/// A per-type free list. Objects released at match teardown (or on death,
/// for robots) return here instead of being dropped; `take` reuses a slot if
/// one is available. Reinserting a value into a reused slot must produce
/// observable behavior identical to a fresh construction, which is why
/// `take`/`release` move the whole value rather than mutating it in place.
#[derive(Debug, Default)]
pub struct Pool<T> {
    free: Vec<T>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    pub fn take(&mut self) -> Option<T> {
        self.free.pop()
    }

    pub fn release(&mut self, value: T) {
        self.free.push(value);
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

/// Reusable-object pools for the three types the core recycles on map
/// teardown or death: robots, projectiles, and dropped items.
#[derive(Debug, Default)]
pub struct ReusablePools {
    pub robots: Pool<Robot>,
    pub projectiles: Pool<Projectile>,
    pub items: Pool<Item>,
}

impl ReusablePools {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reuses_released_slot() {
        let mut pool: Pool<u32> = Pool::new();
        assert!(pool.take().is_none());
        pool.release(7);
        assert_eq!(pool.take(), Some(7));
        assert!(pool.take().is_none());
    }
}
