//! Randomness capability for the outcome engine.
//!
//! The engine never touches a global RNG; it consumes a [`UnitRng`] handed
//! in by the caller. Production code uses [`DigRng`], a ChaCha stream keyed
//! by `(seed, session nonce, dig index)` so every dig has its own
//! reproducible stream. Tests inject scripted sequences instead.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A uniform `[0, 1)` draw source.
pub trait UnitRng {
    fn next_unit(&mut self) -> f64;
}

/// Adapter driving [`UnitRng`] from any [`RngCore`] source.
pub struct EntropyRng<R>(pub R);

impl<R: RngCore> UnitRng for EntropyRng<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Deterministic per-dig randomness.
///
/// Keying each dig separately (rather than advancing one long stream) means
/// a dig can be re-evaluated in isolation, e.g. when replaying a session
/// from its inputs.
pub struct DigRng(ChaCha8Rng);

impl DigRng {
    pub fn new(seed: u64, session_nonce: u64, dig_index: u32) -> Self {
        let mut key = [0u8; 32];
        key[..8].copy_from_slice(&seed.to_le_bytes());
        key[8..16].copy_from_slice(&session_nonce.to_le_bytes());
        key[16..20].copy_from_slice(&dig_index.to_le_bytes());
        Self(ChaCha8Rng::from_seed(key))
    }
}

impl UnitRng for DigRng {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}
