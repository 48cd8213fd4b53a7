//! Seeded randomness, identifier generation, and small shared helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform random source. A single-method seam so combat and salary rolls can
/// be scripted in tests.
pub trait Dice {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    fn chance(&mut self, probability: f64) -> bool {
        self.roll() < probability
    }

    /// Uniform index in `[0, bound)`; 0 when the bound is empty.
    fn pick(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        ((self.roll() * bound as f64) as usize).min(bound - 1)
    }

    /// In-place Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.pick(i + 1);
            items.swap(i, j);
        }
    }
}

/// Splitmix64 stream. One instance per world; a fixed seed replays a whole
/// game within one process.
#[derive(Debug, Clone)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Compact base36 identifier drawn from this stream.
    pub fn generate_id(&mut self) -> String {
        let mut value = self.next_u64() | 1;
        let mut id = String::with_capacity(13);
        while value > 0 {
            let digit = (value % 36) as u32;
            id.push(char::from_digit(digit, 36).unwrap_or('0'));
            value /= 36;
        }
        id
    }
}

impl Dice for GameRng {
    fn roll(&mut self) -> f64 {
        // 53 mantissa bits give a uniform double in [0, 1).
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Wall-clock milliseconds; timestamps are cosmetic and never feed game logic.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_unit_interval() {
        let mut rng = GameRng::new(7);
        for _ in 0..1_000 {
            let roll = rng.roll();
            assert!((0.0..1.0).contains(&roll));
        }
    }

    #[test]
    fn pick_respects_bound() {
        let mut rng = GameRng::new(11);
        for bound in 1..20 {
            for _ in 0..50 {
                assert!(rng.pick(bound) < bound);
            }
        }
        assert_eq!(rng.pick(0), 0);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut rng = GameRng::new(42);
        let mut items = (0..32).collect::<Vec<_>>();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let mut rng = GameRng::new(1337);
        let first = rng.generate_id();
        let second = rng.generate_id();
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn same_seed_replays_the_stream() {
        let mut a = GameRng::new(99);
        let mut b = GameRng::new(99);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
