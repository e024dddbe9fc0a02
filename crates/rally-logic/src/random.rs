//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG so a match can be replayed from its seed.
//! Uses xorshift64*.

/// Seeded random number generator
///
/// Deterministic: same seed + match index = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and match index
    pub fn new(seed: &[u8; 32], match_index: u32) -> Self {
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        state ^= (match_index as u64).wrapping_mul(0x517cc1b727220a95);

        // xorshift never leaves the zero state
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }
        rng
    }

    /// Derive an independent generator for one rally of the match
    pub fn for_rally(&self, rally: u32) -> Self {
        let mut state = self.state ^ (rally as u64 + 1).wrapping_mul(0x9e3779b97f4a7c15);
        if state == 0 {
            state = 0x517cc1b727220a95;
        }
        let mut rng = Self { state };
        rng.next_u64();
        rng
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    /// Generate next u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform float in [low, high)
    pub fn next_uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Generate a value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Generate a value in range [0, max], inclusive
    pub fn next_inclusive(&mut self, max: u32) -> u32 {
        self.next_range(max.saturating_add(1))
    }

    /// Fair coin
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}
