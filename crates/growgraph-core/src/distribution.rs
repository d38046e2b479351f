//! # Count Distributions
//!
//! Non-negative integer samplers that answer "how many instances this round"
//! and "how many role players this round".
//!
//! Two families:
//! - **Fixed**: constant, inclusive uniform, discrete Gaussian, bounded Zipf.
//! - **Scaling**: constant, discrete Gaussian, bounded Zipf. Parameters are
//!   fractions of the live dataset scale, re-read from storage on every call,
//!   so the generation rate tracks growth.
//!
//! Every distribution supports `peek()`: it draws once and caches, and the
//! next `sample()` returns the cached value. Scaling variants discard a cached
//! peek when the live scale has moved since it was drawn.

use crate::SynthError;
use crate::context::SampleContext;
use crate::primitives::{
    ZIPF_EXPONENT_LOWER_BOUND, ZIPF_EXPONENT_UPPER_BOUND, ZIPF_REFERENCE_SCALE,
    ZIPF_SOLVER_ITERATIONS,
};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Zipf};

// =============================================================================
// DISTRIBUTION KINDS
// =============================================================================

/// Parameters of each supported distribution.
#[derive(Debug, Clone)]
enum DistributionKind {
    Constant(u64),
    Uniform {
        lo: u64,
        hi: u64,
    },
    DiscreteGaussian {
        mean: f64,
        stddev: f64,
    },
    BoundedZipf {
        zipf: Zipf<f64>,
    },
    ScalingConstant {
        fraction: f64,
    },
    ScalingDiscreteGaussian {
        mean_fraction: f64,
        stddev_fraction: f64,
    },
    ScalingBoundedZipf(ScalingZipf),
}

impl DistributionKind {
    fn is_scaling(&self) -> bool {
        matches!(
            self,
            DistributionKind::ScalingConstant { .. }
                | DistributionKind::ScalingDiscreteGaussian { .. }
                | DistributionKind::ScalingBoundedZipf(_)
        )
    }

    /// Draw a fresh value. `scale` is only meaningful for scaling kinds.
    fn draw(&mut self, ctx: &mut SampleContext<'_>, scale: u64) -> u64 {
        match self {
            DistributionKind::Constant(c) => *c,
            DistributionKind::Uniform { lo, hi } => ctx.rng().gen_range(*lo..=*hi),
            DistributionKind::DiscreteGaussian { mean, stddev } => {
                discrete_gaussian(ctx, *mean, *stddev)
            }
            DistributionKind::BoundedZipf { zipf } => zipf.sample(ctx.rng()) as u64,
            DistributionKind::ScalingConstant { fraction } => scaled_range(scale, *fraction),
            DistributionKind::ScalingDiscreteGaussian {
                mean_fraction,
                stddev_fraction,
            } => {
                let scale = scale as f64;
                discrete_gaussian(ctx, scale * *mean_fraction, scale * *stddev_fraction)
            }
            DistributionKind::ScalingBoundedZipf(scaling) => scaling.draw(ctx, scale),
        }
    }
}

fn discrete_gaussian(ctx: &mut SampleContext<'_>, mean: f64, stddev: f64) -> u64 {
    let z: f64 = StandardNormal.sample(ctx.rng());
    (stddev * z + mean).trunc().max(0.0) as u64
}

/// A value drawn by `peek()` and not yet consumed.
#[derive(Debug, Clone, Copy)]
struct Peeked {
    value: u64,
    /// Live scale at draw time, for scaling kinds.
    scale: Option<u64>,
}

// =============================================================================
// COUNT DISTRIBUTION
// =============================================================================

/// A count distribution with a one-value peek cache.
#[derive(Debug, Clone)]
pub struct CountDistribution {
    kind: DistributionKind,
    peeked: Option<Peeked>,
}

impl CountDistribution {
    fn from_kind(kind: DistributionKind) -> Self {
        Self { kind, peeked: None }
    }

    /// Always `value`.
    #[must_use]
    pub fn constant(value: u64) -> Self {
        Self::from_kind(DistributionKind::Constant(value))
    }

    /// Uniform integer in `[lo, hi]`, both inclusive.
    pub fn uniform(lo: u64, hi: u64) -> Result<Self, SynthError> {
        if lo > hi {
            return Err(SynthError::InvalidDistribution(format!(
                "uniform range [{}, {}] is empty",
                lo, hi
            )));
        }
        Ok(Self::from_kind(DistributionKind::Uniform { lo, hi }))
    }

    /// `max(0, trunc(stddev * z + mean))` with `z` standard normal.
    pub fn discrete_gaussian(mean: f64, stddev: f64) -> Result<Self, SynthError> {
        check_gaussian_params(mean, stddev)?;
        Ok(Self::from_kind(DistributionKind::DiscreteGaussian {
            mean,
            stddev,
        }))
    }

    /// Zipf over ranks `1..=range_limit`.
    pub fn bounded_zipf(range_limit: u64, exponent: f64) -> Result<Self, SynthError> {
        let zipf = build_zipf(range_limit, exponent)?;
        Ok(Self::from_kind(DistributionKind::BoundedZipf { zipf }))
    }

    /// Always `trunc(scale * fraction)` for the live scale.
    pub fn scaling_constant(fraction: f64) -> Result<Self, SynthError> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "scaling constant fraction {} must be finite and non-negative",
                fraction
            )));
        }
        Ok(Self::from_kind(DistributionKind::ScalingConstant { fraction }))
    }

    /// Discrete Gaussian whose mean and standard deviation are fractions of
    /// the live scale.
    pub fn scaling_discrete_gaussian(
        mean_fraction: f64,
        stddev_fraction: f64,
    ) -> Result<Self, SynthError> {
        check_gaussian_params(mean_fraction, stddev_fraction)?;
        if mean_fraction < 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "scaling mean fraction {} is negative",
                mean_fraction
            )));
        }
        Ok(Self::from_kind(DistributionKind::ScalingDiscreteGaussian {
            mean_fraction,
            stddev_fraction,
        }))
    }

    /// Bounded Zipf whose range is `trunc(scale * range_fraction)`.
    ///
    /// `starting_exponent` (> 1.0) is the exponent at the reference scale of
    /// [`ZIPF_REFERENCE_SCALE`]; as the scale moves the exponent is re-solved
    /// so that `mean / range` stays what it was there.
    pub fn scaling_bounded_zipf(
        range_fraction: f64,
        starting_exponent: f64,
    ) -> Result<Self, SynthError> {
        let scaling = ScalingZipf::new(range_fraction, starting_exponent)?;
        Ok(Self::from_kind(DistributionKind::ScalingBoundedZipf(scaling)))
    }

    /// Whether parameters follow the live scale.
    #[must_use]
    pub fn is_scaling(&self) -> bool {
        self.kind.is_scaling()
    }

    /// The value the next `sample()` will return, without consuming it.
    pub fn peek(&mut self, ctx: &mut SampleContext<'_>) -> Result<u64, SynthError> {
        let scale = if self.kind.is_scaling() {
            Some(ctx.current_scale()?)
        } else {
            None
        };

        if let Some(peeked) = self.peeked
            && peeked.scale == scale
        {
            return Ok(peeked.value);
        }

        let value = self.kind.draw(ctx, scale.unwrap_or(0));
        self.peeked = Some(Peeked { value, scale });
        Ok(value)
    }

    /// Draw a value, consuming any cached peek.
    pub fn sample(&mut self, ctx: &mut SampleContext<'_>) -> Result<u64, SynthError> {
        let value = self.peek(ctx)?;
        self.peeked = None;
        Ok(value)
    }

    /// Drop any cached peek so the next call draws fresh.
    pub fn discard_peek(&mut self) {
        self.peeked = None;
    }
}

fn check_gaussian_params(mean: f64, stddev: f64) -> Result<(), SynthError> {
    if !mean.is_finite() || !stddev.is_finite() || stddev < 0.0 {
        return Err(SynthError::InvalidDistribution(format!(
            "gaussian needs finite mean and non-negative stddev, got ({}, {})",
            mean, stddev
        )));
    }
    Ok(())
}

fn build_zipf(range_limit: u64, exponent: f64) -> Result<Zipf<f64>, SynthError> {
    if range_limit == 0 {
        return Err(SynthError::InvalidDistribution(
            "zipf range limit must be at least 1".to_string(),
        ));
    }
    if !exponent.is_finite() {
        return Err(SynthError::InvalidDistribution(format!(
            "zipf exponent {} is not finite",
            exponent
        )));
    }
    Zipf::new(range_limit, exponent).map_err(|e| {
        SynthError::InvalidDistribution(format!("zipf({}, {}): {}", range_limit, exponent, e))
    })
}

// =============================================================================
// SCALING ZIPF
// =============================================================================

/// Exponent solved for one range. `None` means no exponent gets the mean
/// down to the target, so every draw is 1.
#[derive(Debug, Clone, Copy)]
struct SolvedZipf {
    range: u64,
    zipf: Option<Zipf<f64>>,
}

#[derive(Debug, Clone)]
struct ScalingZipf {
    range_fraction: f64,
    /// `mean / range` at the reference scale.
    target_ratio: f64,
    solved: Option<SolvedZipf>,
}

impl ScalingZipf {
    fn new(range_fraction: f64, starting_exponent: f64) -> Result<Self, SynthError> {
        if !range_fraction.is_finite() || range_fraction <= 0.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "zipf range fraction {} must be positive",
                range_fraction
            )));
        }
        if !starting_exponent.is_finite() || starting_exponent <= 1.0 {
            return Err(SynthError::InvalidDistribution(format!(
                "starting zipf exponent must be > 1.0, is {}",
                starting_exponent
            )));
        }

        let reference_range = scaled_range(ZIPF_REFERENCE_SCALE, range_fraction);
        if reference_range == 0 {
            return Err(SynthError::InvalidDistribution(format!(
                "zipf range fraction {} gives an empty range at scale {}",
                range_fraction, ZIPF_REFERENCE_SCALE
            )));
        }
        let target_ratio = zipf_mean(reference_range, starting_exponent) / reference_range as f64;

        let solved = SolvedZipf {
            range: reference_range,
            zipf: Some(build_zipf(reference_range, starting_exponent)?),
        };

        Ok(Self {
            range_fraction,
            target_ratio,
            solved: Some(solved),
        })
    }

    fn draw(&mut self, ctx: &mut SampleContext<'_>, scale: u64) -> u64 {
        let range = scaled_range(scale, self.range_fraction);
        if range == 0 {
            return 0;
        }

        let solved = match self.solved {
            Some(s) if s.range == range => s,
            _ => {
                let s = SolvedZipf {
                    range,
                    zipf: solve_exponent(range, self.target_ratio)
                        .and_then(|exponent| Zipf::new(range, exponent).ok()),
                };
                tracing::trace!(range, solved = s.zipf.is_some(), "re-solved zipf exponent");
                self.solved = Some(s);
                s
            }
        };

        match solved.zipf {
            Some(zipf) => zipf.sample(ctx.rng()) as u64,
            None => 1,
        }
    }
}

fn scaled_range(scale: u64, fraction: f64) -> u64 {
    (scale as f64 * fraction).trunc() as u64
}

/// Mean of Zipf over `1..=n` with exponent `s`: `H(n, s - 1) / H(n, s)`.
fn zipf_mean(n: u64, s: f64) -> f64 {
    let (numerator, denominator) = (1..=n).fold((0.0, 0.0), |(num, den), k| {
        let k = k as f64;
        (num + k.powf(1.0 - s), den + k.powf(-s))
    });
    numerator / denominator
}

/// Find the exponent whose `mean / range` equals `target_ratio`.
///
/// The mean falls as the exponent rises, so bisection over the search bounds
/// converges. Returns `None` when even the upper bound leaves the mean too
/// large. A target above what the lower bound can reach is clamped to it.
fn solve_exponent(range: u64, target_ratio: f64) -> Option<f64> {
    let range_f = range as f64;
    let gap = |s: f64| target_ratio - zipf_mean(range, s) / range_f;

    if gap(ZIPF_EXPONENT_UPPER_BOUND) <= 0.0 {
        return None;
    }
    if gap(ZIPF_EXPONENT_LOWER_BOUND) >= 0.0 {
        return Some(ZIPF_EXPONENT_LOWER_BOUND);
    }

    let mut lo = ZIPF_EXPONENT_LOWER_BOUND;
    let mut hi = ZIPF_EXPONENT_UPPER_BOUND;
    for _ in 0..ZIPF_SOLVER_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if gap(mid) < 0.0 {
            // Mean still too large
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

// =============================================================================
// TESTS
// =============================================================================
