use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh32::xxh32;

/// The single random source of a generation session.
///
/// Every randomized decision (terrain picks, placement attempts, NPC counts,
/// relationship strengths) draws from the one instance owned by the engine,
/// so identical seeds and identical feature order replay bit-for-bit.
pub struct SessionRng {
    inner: ChaCha8Rng,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Resolve a seed given as free text.
///
/// Text that parses as an unsigned integer is used as-is; anything else is
/// hashed to a 32-bit value.
pub fn seed_from_text(text: &str) -> u64 {
    match text.trim().parse::<u64>() {
        Ok(value) => value,
        Err(_) => u64::from(xxh32(text.as_bytes(), 0)),
    }
}

/// Helpers for the random operations used across generation.
pub trait RngExt {
    /// Uniformly chosen element, `None` for an empty slice.
    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T>;
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng> RngExt for R {
    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.gen_range(0..items.len())])
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
