// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded random source for the simulation core.
//!
//! Every random draw in the engine goes through a [`RandomSource`] owned by
//! the connectome — there is no ambient or process-global randomness. Two
//! sources built from the same seed produce identical draw sequences for
//! identical call sequences, which is what makes whole simulations
//! reproducible byte-for-byte.

use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution};

/// Seeded generator supplying the draw primitives the engine needs.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
    seed: u64,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this source was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One Bernoulli(p) trial. `p` must lie in [0, 1].
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    /// One Binomial(n, p) draw.
    pub fn binomial(&mut self, n: u64, p: f64) -> u64 {
        // p is validated at connectome construction.
        let distribution = Binomial::new(n, p).expect("edge probability validated in (0, 1]");
        distribution.sample(&mut self.rng)
    }

    /// Uniform draw from `[0, bound)`.
    pub fn uniform_index(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }

    /// Uniform draw from `[0, 1)`.
    pub fn uniform_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// `count` distinct values from `[0, bound)` via Floyd's algorithm:
    /// O(count) draws regardless of `bound`, no allocation proportional to
    /// `bound`. Returned in draw order.
    pub fn sample_distinct(&mut self, bound: u64, count: usize) -> Vec<u64> {
        let count = count.min(bound as usize);
        let mut chosen: AHashSet<u64> = AHashSet::with_capacity(count);
        let mut out = Vec::with_capacity(count);
        for j in (bound - count as u64)..bound {
            let t = self.rng.gen_range(0..=j);
            let pick = if chosen.contains(&t) { j } else { t };
            chosen.insert(pick);
            out.push(pick);
        }
        out
    }

    /// Derive a reproducibly-seeded child stream. The child depends only on
    /// this source's seed and `tag`, not on how much of this stream has been
    /// consumed — partitioned work gets stable sub-streams.
    pub fn substream(&self, tag: u64) -> RandomSource {
        RandomSource::from_seed(splitmix64(self.seed ^ tag.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

/// SplitMix64 finalizer, the standard seed-spreading mix.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
