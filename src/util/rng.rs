//! Seeded pseudo-random number generator.
//!
//! A small xorshift64 generator, seeded from OS entropy in production. Used
//! for the per-worker run-slice jitter, which is drawn once per worker
//! lifetime from a process-wide generator under a mutex.

/// A xorshift64 pseudo-random number generator.
///
/// Not cryptographically secure; jitter is the only consumer.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Creates a generator from the given seed.
    ///
    /// A zero seed is replaced with 1 (xorshift has a zero fixed point).
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Creates a generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf).expect("OS entropy failed");
        Self::new(u64::from_le_bytes(buf))
    }

    /// Generates the next pseudo-random u64 value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Draws a value uniformly from `[-magnitude, magnitude]`.
    pub fn next_signed_up_to(&mut self, magnitude: i64) -> i64 {
        debug_assert!(magnitude >= 0);
        if magnitude == 0 {
            return 0;
        }
        let span = (magnitude as u64) * 2 + 1;
        -magnitude + (self.next_u64() % span) as i64
    }
}
