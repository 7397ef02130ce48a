// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Aggregate-sampling statistics for the lazy connectome.
//!
//! The number of live inputs landing on a never-visited candidate neuron is
//! `Bin(total_k, p)` — `total_k` independent Bernoulli(p) sources. The lazy
//! variant draws these counts directly instead of flipping one coin per
//! source per candidate, and only examines the upper tail of the
//! distribution, because only tail candidates can compete for the winner set.
//!
//! Two regimes:
//! - `total_k` small enough to walk: exact log-space pmf walk (no underflow),
//!   exact inverse-CDF table sampling on the conditioned tail.
//! - beyond the walk limit: Normal approximation of the Binomial with
//!   continuity correction, sampled by inverse CDF on the truncated range.

use crate::rng::RandomSource;

/// Above this `n`, quantile and tail sampling switch from the exact pmf walk
/// to the Normal approximation. At the walk limit `n * p * (1 - p)` is large
/// for any p this engine accepts, so the continuous approximation is faithful
/// where it is used.
const EXACT_WALK_LIMIT: u64 = 1 << 20;

/// How many standard deviations past the mean the exact sampler tabulates.
/// Mass beyond this is below f64 resolution of the tabulated total.
const EXACT_TAIL_SPAN_SIGMAS: f64 = 12.0;

/// Smallest `alpha` with `P(Bin(n, p) <= alpha) >= q`.
pub fn binomial_ppf(q: f64, n: u64, p: f64) -> u64 {
    if q <= 0.0 || n == 0 || p <= 0.0 {
        return 0;
    }
    if q >= 1.0 || p >= 1.0 {
        return n;
    }
    if n <= EXACT_WALK_LIMIT {
        // Exact CDF walk. log-space pmf recurrence avoids underflow at large
        // n: pmf(i+1)/pmf(i) = (n-i)/(i+1) * p/(1-p).
        let log_ratio = (p / (1.0 - p)).ln();
        let mut log_pmf = n as f64 * (1.0 - p).ln();
        let mut cdf = log_pmf.exp();
        let mut i = 0u64;
        while i < n && cdf < q {
            log_pmf += ((n - i) as f64 / (i + 1) as f64).ln() + log_ratio;
            i += 1;
            cdf += log_pmf.exp();
        }
        i
    } else {
        quantile_normal_bound(q, n, p)
    }
}

fn quantile_normal_bound(q: f64, n: u64, p: f64) -> u64 {
    let mu = n as f64 * p;
    let sigma = (n as f64 * p * (1.0 - p)).sqrt();
    let x = mu + sigma * normal_quantile(q) + 0.5;
    x.clamp(0.0, n as f64).round() as u64
}

/// Sampler for `Bin(n, p)` conditioned on the outcome being `>= alpha`.
///
/// Draws are integer-valued, returned as `f64` so they can be compared
/// directly against exact candidate input sums.
#[derive(Debug, Clone)]
pub struct TailSampler {
    kind: TailKind,
}

#[derive(Debug, Clone)]
enum TailKind {
    /// Degenerate tail: a single possible outcome.
    Constant(f64),
    /// Exact conditioned pmf over `first..first + cumulative.len()`.
    Exact { first: u64, cumulative: Vec<f64> },
    /// Truncated-Normal approximation over `[alpha, n]`.
    Normal {
        mu: f64,
        sigma: f64,
        min: f64,
        max: f64,
        cdf_lo: f64,
        cdf_hi: f64,
    },
}

impl TailSampler {
    pub fn new(n: u64, p: f64, alpha: u64) -> Self {
        let alpha = alpha.min(n);
        if n == 0 || p >= 1.0 || alpha == n {
            return Self {
                kind: TailKind::Constant(if p >= 1.0 { n as f64 } else { alpha as f64 }),
            };
        }
        if p <= 0.0 {
            return Self {
                kind: TailKind::Constant(alpha as f64),
            };
        }

        let mu = n as f64 * p;
        let sigma = (n as f64 * p * (1.0 - p)).sqrt();

        if n <= EXACT_WALK_LIMIT {
            // Walk to alpha, then tabulate the conditioned tail until its
            // remaining mass is negligible.
            let log_ratio = (p / (1.0 - p)).ln();
            let mut log_pmf = n as f64 * (1.0 - p).ln();
            for i in 0..alpha {
                log_pmf += ((n - i) as f64 / (i + 1) as f64).ln() + log_ratio;
            }
            // The table must cover the conditioned mass: up past the mean
            // when alpha sits below it, and a fixed margin past alpha when
            // alpha is already deep in the tail.
            let reach = (mu + EXACT_TAIL_SPAN_SIGMAS * sigma).ceil() as u64;
            let last = n.min(alpha.max(reach).saturating_add(16));
            let mut cumulative = Vec::with_capacity((last - alpha + 1) as usize);
            let mut total = 0.0f64;
            let mut i = alpha;
            loop {
                total += log_pmf.exp();
                cumulative.push(total);
                if i == last {
                    break;
                }
                log_pmf += ((n - i) as f64 / (i + 1) as f64).ln() + log_ratio;
                i += 1;
            }
            Self {
                kind: TailKind::Exact { first: alpha, cumulative },
            }
        } else {
            // Continuity-corrected truncation edges.
            let lo = alpha as f64 - 0.5;
            let hi = n as f64 + 0.5;
            Self {
                kind: TailKind::Normal {
                    mu,
                    sigma,
                    min: alpha as f64,
                    max: n as f64,
                    cdf_lo: normal_cdf((lo - mu) / sigma),
                    cdf_hi: normal_cdf((hi - mu) / sigma),
                },
            }
        }
    }

    /// Draw one conditioned count.
    pub fn sample(&self, rng: &mut RandomSource) -> f64 {
        match &self.kind {
            TailKind::Constant(value) => *value,
            TailKind::Exact { first, cumulative } => {
                let total = *cumulative.last().expect("tail table is never empty");
                let u = rng.uniform_f64() * total;
                let offset = cumulative.partition_point(|&c| c < u);
                (*first + offset.min(cumulative.len() - 1) as u64) as f64
            }
            TailKind::Normal {
                mu,
                sigma,
                min,
                max,
                cdf_lo,
                cdf_hi,
            } => {
                let u = cdf_lo + rng.uniform_f64() * (cdf_hi - cdf_lo);
                let x = mu + sigma * normal_quantile(u.clamp(1e-16, 1.0 - 1e-16));
                x.round().clamp(*min, *max)
            }
        }
    }
}

/// Standard normal CDF via the Abramowitz & Stegun 7.1.26 erf approximation
/// (absolute error < 1.5e-7).
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / core::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Standard normal quantile, Acklam's rational approximation
/// (absolute error < 1.2e-9 over (0, 1)).
fn normal_quantile(q: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const Q_LOW: f64 = 0.02425;

    debug_assert!(q > 0.0 && q < 1.0);
    if q < Q_LOW {
        let r = (-2.0 * q.ln()).sqrt();
        (((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    } else if q <= 1.0 - Q_LOW {
        let r = q - 0.5;
        let s = r * r;
        (((((A[0] * s + A[1]) * s + A[2]) * s + A[3]) * s + A[4]) * s + A[5]) * r
            / (((((B[0] * s + B[1]) * s + B[2]) * s + B[3]) * s + B[4]) * s + 1.0)
    } else {
        let r = (-2.0 * (1.0 - q).ln()).sqrt();
        -(((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct-summation binomial CDF for small n, as a reference.
    fn reference_cdf(x: u64, n: u64, p: f64) -> f64 {
        let mut sum = 0.0;
        for i in 0..=x {
            let mut log_c = 0.0;
            for j in 0..i {
                log_c += ((n - j) as f64).ln() - ((j + 1) as f64).ln();
            }
            sum += (log_c + i as f64 * p.ln() + (n - i) as f64 * (1.0 - p).ln()).exp();
        }
        sum
    }

    #[test]
    fn ppf_matches_reference_for_small_n() {
        let (n, p) = (20, 0.3);
        for q in [0.01, 0.25, 0.5, 0.75, 0.9, 0.99] {
            let alpha = binomial_ppf(q, n, p);
            assert!(reference_cdf(alpha, n, p) >= q - 1e-9);
            if alpha > 0 {
                assert!(reference_cdf(alpha - 1, n, p) < q + 1e-9);
            }
        }
    }

    #[test]
    fn ppf_is_monotone_in_q() {
        let mut last = 0;
        for q in [0.1, 0.3, 0.5, 0.7, 0.9, 0.99] {
            let alpha = binomial_ppf(q, 500, 0.1);
            assert!(alpha >= last);
            last = alpha;
        }
    }

    #[test]
    fn ppf_degenerate_probabilities() {
        assert_eq!(binomial_ppf(0.5, 100, 1.0), 100);
        assert_eq!(binomial_ppf(0.5, 100, 0.0), 0);
        assert_eq!(binomial_ppf(0.0, 100, 0.5), 0);
    }

    #[test]
    fn tail_samples_stay_in_range() {
        let (n, p) = (1000u64, 0.1);
        let alpha = binomial_ppf(0.95, n, p);
        let sampler = TailSampler::new(n, p, alpha);
        let mut rng = RandomSource::from_seed(5);
        for _ in 0..500 {
            let draw = sampler.sample(&mut rng);
            assert!(draw >= alpha as f64);
            assert!(draw <= n as f64);
            assert_eq!(draw, draw.round());
        }
    }

    #[test]
    fn tail_mean_sits_above_unconditioned_mean() {
        let (n, p) = (1000u64, 0.1);
        let alpha = binomial_ppf(0.99, n, p);
        let sampler = TailSampler::new(n, p, alpha);
        let mut rng = RandomSource::from_seed(6);
        let mean: f64 = (0..2000).map(|_| sampler.sample(&mut rng)).sum::<f64>() / 2000.0;
        assert!(mean > n as f64 * p);
    }

    #[test]
    fn tail_sampling_is_deterministic() {
        let sampler = TailSampler::new(400, 0.2, binomial_ppf(0.9, 400, 0.2));
        let mut a = RandomSource::from_seed(1);
        let mut b = RandomSource::from_seed(1);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut a), sampler.sample(&mut b));
        }
    }

    #[test]
    fn unconditioned_tail_covers_the_distribution_mass() {
        // alpha = 0 degenerates to the full Binomial; draws must center on
        // the mean, not on the table edge.
        let sampler = TailSampler::new(1000, 0.5, 0);
        let mut rng = RandomSource::from_seed(3);
        let mean: f64 = (0..2000).map(|_| sampler.sample(&mut rng)).sum::<f64>() / 2000.0;
        assert!((mean - 500.0).abs() < 5.0, "mean {mean}");
    }

    #[test]
    fn degenerate_tails_are_constant() {
        let sampler = TailSampler::new(10, 1.0, 4);
        let mut rng = RandomSource::from_seed(2);
        assert_eq!(sampler.sample(&mut rng), 10.0);

        let sampler = TailSampler::new(10, 0.5, 10);
        assert_eq!(sampler.sample(&mut rng), 10.0);
    }

    #[test]
    fn normal_quantile_inverts_cdf() {
        for q in [0.001, 0.01, 0.1, 0.5, 0.9, 0.99, 0.999] {
            let x = normal_quantile(q);
            assert!((normal_cdf(x) - q).abs() < 1e-6, "q={q}");
        }
    }
}
