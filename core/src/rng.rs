//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through SourceRng instances derived
//! from the single master seed stored on the GeneratorConfig.
//!
//! Each lead source gets its own RNG stream, seeded deterministically
//! from (master_seed XOR source_index). This means:
//!   - Appending a new source never changes existing sources' streams.
//!   - Each source's series is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Above this mean Poisson draws switch to a normal approximation.
const POISSON_NORMAL_CUTOVER: f64 = 500.0;

/// A named, deterministic RNG for a single lead source.
pub struct SourceRng {
    pub name: String,
    inner: Pcg64Mcg,
}

impl SourceRng {
    /// Create a source RNG from the master seed and a stable
    /// source index. The index must never change once assigned.
    pub fn new(master_seed: u64, source_index: u64) -> Self {
        let derived_seed = master_seed ^ (source_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed".into(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Standard normal via Box-Muller.
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    /// Sample from Normal(mean, sd).
    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        mean + sd * self.standard_normal()
    }

    /// Sample a Poisson count with the given mean.
    /// Knuth's product method for small means, normal approximation above
    /// POISSON_NORMAL_CUTOVER.
    pub fn poisson(&mut self, mean: f64) -> u64 {
        if mean <= 0.0 || !mean.is_finite() {
            return 0;
        }
        if mean > POISSON_NORMAL_CUTOVER {
            return self.normal(mean, mean.sqrt()).round().max(0.0) as u64;
        }
        let limit = (-mean).exp();
        let mut k = 0u64;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Number of successes in `trials` Bernoulli(p) trials.
    /// Never exceeds `trials`.
    pub fn binomial(&mut self, trials: u64, p: f64) -> u64 {
        if p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return trials;
        }
        (0..trials).filter(|_| self.chance(p)).count() as u64
    }
}

/// All source RNGs for a single generation run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Slots follow the order sources are listed in the config.
    /// NEVER reorder sources in a shipped config; only append.
    pub fn for_source(&self, slot: usize, name: &str) -> SourceRng {
        SourceRng::new(self.master_seed, slot as u64).with_name(name)
    }
}
