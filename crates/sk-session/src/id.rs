use rand::Rng;

/// 32-bit session id: 16 bits of random "magic" (high) plus a 16-bit
/// per-process counter (low), so ids never repeat within a process
/// lifetime and a stale id from a prior run is very unlikely to collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

#[derive(Debug)]
pub struct SessionIdGenerator {
    magic: u16,
    counter: u16,
}

impl SessionIdGenerator {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self { magic: rng.gen(), counter: 0 }
    }

    pub fn next(&mut self) -> SessionId {
        let id = SessionId(((self.magic as u32) << 16) | self.counter as u32);
        self.counter = self.counter.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ids_increment_and_share_magic() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = SessionIdGenerator::new(&mut rng);
        let a = gen.next();
        let b = gen.next();
        assert_eq!(a.0 >> 16, b.0 >> 16);
        assert_eq!((a.0 & 0xFFFF) + 1, b.0 & 0xFFFF);
    }
}
