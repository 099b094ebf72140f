/// 24-bit spawn counter embedded in an [`ObjectGuid`]. Counters are
/// per-map (not global) except [`ObjectType::Player`], whose counter is
/// process-global (see [`crate::guid::GuidGenerator`]).
pub type SpawnCounter = u32;

const COUNTER_BITS: u32 = 24;
const COUNTER_MASK: u32 = (1 << COUNTER_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectType {
    Player = 0,
    Robot = 1,
    Projectile = 2,
    ItemBox = 3,
    Item = 4,
    UnitLocator = 5,
}

impl ObjectType {
    const ALL: [ObjectType; 6] = [
        ObjectType::Player,
        ObjectType::Robot,
        ObjectType::Projectile,
        ObjectType::ItemBox,
        ObjectType::Item,
        ObjectType::UnitLocator,
    ];

    fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| *t as u8 == tag)
    }
}

/// A world object identifier: an 8-bit type tag plus a 24-bit spawn counter,
/// packed into one raw `u32`. Equality is raw-value equality: two guids are
/// the same object iff their raw values match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectGuid(u32);

impl ObjectGuid {
    pub fn new(object_type: ObjectType, counter: SpawnCounter) -> Self {
        debug_assert!(counter <= COUNTER_MASK, "spawn counter overflowed 24 bits");
        Self(((object_type as u32) << COUNTER_BITS) | (counter & COUNTER_MASK))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn object_type(self) -> ObjectType {
        ObjectType::from_tag((self.0 >> COUNTER_BITS) as u8).expect("guid always carries a valid type tag")
    }

    pub fn counter(self) -> SpawnCounter {
        self.0 & COUNTER_MASK
    }
}

/// Generates strictly increasing spawn counters per [`ObjectType`].
/// A map owns one generator; the player counter is instead held by the
/// theater manager and shared process-wide.
#[derive(Debug, Default)]
pub struct GuidGenerator {
    next: rustc_hash::FxHashMap<u8, SpawnCounter>,
}

impl GuidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next guid for `object_type`. Panics if the 24-bit
    /// counter space for that type is exhausted, which would require several
    /// hundred years of continuous spawning at any plausible rate.
    pub fn generate(&mut self, object_type: ObjectType) -> ObjectGuid {
        let counter = self.next.entry(object_type as u8).or_insert(0);
        let id = *counter;
        assert!(id <= COUNTER_MASK, "spawn counter exhausted for {object_type:?}");
        *counter += 1;
        ObjectGuid::new(object_type, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_type_and_counter() {
        let guid = ObjectGuid::new(ObjectType::Robot, 1234);
        assert_eq!(guid.object_type(), ObjectType::Robot);
        assert_eq!(guid.counter(), 1234);
    }

    #[test]
    fn generator_is_monotone_per_type() {
        let mut gen = GuidGenerator::new();
        let a = gen.generate(ObjectType::Item);
        let b = gen.generate(ObjectType::Item);
        let c = gen.generate(ObjectType::Robot);

        assert!(a.counter() < b.counter());
        // Independent per-type counters: Robot's first id doesn't see Item's history.
        assert_eq!(c.counter(), 0);
    }

    #[test]
    fn equality_is_raw_value_equality() {
        let a = ObjectGuid::new(ObjectType::Player, 5);
        let b = ObjectGuid::from_raw(a.raw());
        assert_eq!(a, b);
    }
}
