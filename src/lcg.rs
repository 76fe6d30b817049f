//! Linear congruential engines: the root of every seed chain.
//!
//! `seed' = (multiplier * seed + increment) mod modulus`. The integer engine
//! multiplies in `u128` so moduli up to 2^64 never wrap.

use serde::{Deserialize, Serialize};

/// LCG parameters as they appear in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcgParams {
    pub modulus: u64,
    pub multiplier: u64,
    pub increment: u64,
    /// Initial state. Generators driven by the order id ignore it.
    #[serde(default)]
    pub seed: u64,
}

impl LcgParams {
    pub const fn new(modulus: u64, multiplier: u64, increment: u64, seed: u64) -> Self {
        Self {
            modulus,
            multiplier,
            increment,
            seed,
        }
    }
}

/// Integer LCG. Owns its state; not shared between generators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    modulus: u64,
    multiplier: u64,
    increment: u64,
    seed: u64,
}

impl Lcg {
    /// Builds an engine from validated parameters (`modulus > 0`).
    pub fn new(params: LcgParams) -> Self {
        Self {
            modulus: params.modulus,
            multiplier: params.multiplier,
            increment: params.increment,
            seed: params.seed,
        }
    }

    /// Advances the engine from its own state and returns the new state.
    pub fn next(&mut self) -> u64 {
        self.next_from(self.seed)
    }

    /// Applies the recurrence to an external value (usually the order id) and
    /// stores the result as the new state.
    pub fn next_from(&mut self, value: u64) -> u64 {
        self.seed = self.apply(value);
        self.seed
    }

    /// Like [`Lcg::next_from`] but under a per-call modulus instead of the
    /// configured one.
    pub fn next_from_mod(&mut self, value: u64, modulus: u64) -> u64 {
        self.seed = self.apply_mod(value, modulus);
        self.seed
    }

    /// One step of the recurrence under an explicit modulus. A zero modulus
    /// yields 0.
    fn apply_mod(&self, value: u64, modulus: u64) -> u64 {
        if modulus == 0 {
            return 0;
        }
        let product = self.multiplier as u128 * value as u128 + self.increment as u128;
        (product % modulus as u128) as u64
    }

    fn apply(&self, value: u64) -> u64 {
        self.apply_mod(value, self.modulus)
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }
}

/// Float parameters for the fill-price delta stream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatLcgParams {
    pub modulus: f64,
    pub multiplier: f64,
    pub increment: f64,
}

/// Float variant of the recurrence, evaluated in `f64` exactly as
/// `(multiplier * value + increment) % modulus`.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatLcg {
    params: FloatLcgParams,
}

impl FloatLcg {
    pub fn new(params: FloatLcgParams) -> Self {
        Self { params }
    }

    pub fn next_from(&self, value: u64) -> f64 {
        let raw = self.params.multiplier * value as f64 + self.params.increment;
        raw % self.params.modulus
    }
}
