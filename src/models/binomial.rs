//! Binomial distribution evaluated in log space.
//!
//! # Governing Equation
//!
//! ```text
//! P(X = k) = C(n, k) · p^k · (1-p)^(n-k)
//!
//! ln P(X = k) = ln Γ(n+1) - ln Γ(k+1) - ln Γ(n-k+1) + k·ln p + (n-k)·ln(1-p)
//! ```
//!
//! Direct factorials overflow `f64` beyond n = 170, so every term is kept in
//! log space and tails are accumulated relative to their largest term.
//! Tail sums always run over the smaller tail so that a probability of
//! 1e-40 is not lost to `1 - (1 - 1e-40)` cancellation.

use super::require_probability;
use crate::error::ModelResult;

/// Lanczos approximation parameters (g = 7, n = 9).
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// ln(√(2π))
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Natural log of the gamma function for `x > 0`.
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin().abs()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let mut series = LANCZOS_COEFFS[0];
    for (i, c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        series += c / (x + i as f64);
    }

    LN_SQRT_2PI + (x + 0.5) * t.ln() - t + series.ln()
}

/// ln C(n, k) for `k <= n`.
#[must_use]
pub fn ln_choose(n: u64, k: u64) -> f64 {
    debug_assert!(k <= n);
    if k == 0 || k == n {
        return 0.0;
    }
    let n_f = n as f64;
    let k_f = k as f64;
    ln_gamma(n_f + 1.0) - ln_gamma(k_f + 1.0) - ln_gamma(n_f - k_f + 1.0)
}

/// Binomial(n, p): number of successes in `n` independent trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binomial {
    trials: u64,
    p: f64,
}

impl Binomial {
    /// Create a binomial distribution.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `p` lies outside `[0, 1]`.
    pub fn new(trials: u64, p: f64) -> ModelResult<Self> {
        let p = require_probability("failure_prob", p)?;
        Ok(Self { trials, p })
    }

    /// Number of trials.
    #[must_use]
    pub const fn trials(&self) -> u64 {
        self.trials
    }

    /// Per-trial success probability.
    #[must_use]
    pub const fn p(&self) -> f64 {
        self.p
    }

    /// Expected number of successes `n·p`.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.trials as f64 * self.p
    }

    /// Most likely outcome, `floor((n+1)·p)` capped at `n`.
    #[must_use]
    pub fn mode(&self) -> u64 {
        let m = ((self.trials as f64 + 1.0) * self.p).floor() as u64;
        m.min(self.trials)
    }

    /// ln P(X = k); `-inf` for impossible outcomes.
    #[must_use]
    pub fn ln_pmf(&self, k: u64) -> f64 {
        let n = self.trials;
        if k > n {
            return f64::NEG_INFINITY;
        }
        if self.p <= 0.0 {
            return if k == 0 { 0.0 } else { f64::NEG_INFINITY };
        }
        if self.p >= 1.0 {
            return if k == n { 0.0 } else { f64::NEG_INFINITY };
        }

        let k_f = k as f64;
        let rest = (n - k) as f64;
        ln_choose(n, k) + k_f * self.p.ln() + rest * (-self.p).ln_1p()
    }

    /// P(X = k).
    #[must_use]
    pub fn pmf(&self, k: u64) -> f64 {
        self.ln_pmf(k).exp()
    }

    /// P(X ≤ k).
    #[must_use]
    pub fn cdf(&self, k: u64) -> f64 {
        if k >= self.trials {
            return 1.0;
        }
        if (k + 1) as f64 > self.mean() {
            (1.0 - self.range_mass(k + 1, self.trials)).clamp(0.0, 1.0)
        } else {
            self.range_mass(0, k).clamp(0.0, 1.0)
        }
    }

    /// P(X ≥ k). Exactly 1 for `k = 0`, since there is no lower tail.
    #[must_use]
    pub fn at_least(&self, k: u64) -> f64 {
        if k == 0 {
            return 1.0;
        }
        if k > self.trials {
            return 0.0;
        }
        if self.p <= 0.0 {
            return 0.0;
        }
        if self.p >= 1.0 {
            return 1.0;
        }

        let tail = if k as f64 > self.mean() {
            self.range_mass(k, self.trials)
        } else {
            1.0 - self.range_mass(0, k - 1)
        };
        tail.clamp(0.0, 1.0)
    }

    /// Σ P(X = i) for `i` in `lo..=hi`, summed relative to the largest term.
    ///
    /// The pmf is unimodal, so the largest term in the range sits at the mode
    /// clamped into `[lo, hi]`. Consecutive terms follow the ratio
    /// `P(i+1)/P(i) = (n-i)/(i+1) · p/(1-p)`.
    fn range_mass(&self, lo: u64, hi: u64) -> f64 {
        let peak = self.mode().clamp(lo, hi);
        let ln_peak = self.ln_pmf(peak);
        if !ln_peak.is_finite() {
            return 0.0;
        }

        let n = self.trials;
        let ln_odds = self.p.ln() - (-self.p).ln_1p();
        let mut ln_term = self.ln_pmf(lo);
        let mut scaled = 0.0;
        for i in lo..=hi {
            scaled += (ln_term - ln_peak).exp();
            if i < hi {
                ln_term += ((n - i) as f64 / (i + 1) as f64).ln() + ln_odds;
            }
        }

        ln_peak.exp() * scaled
    }
}
