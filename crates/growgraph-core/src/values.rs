//! # Value Providers
//!
//! Sources of synthetic attribute values.
//!
//! A value provider may be finite. When it runs dry the attribute batch that
//! uses it simply ends early; exhaustion is never an error.

use crate::AttributeValue;
use crate::SynthError;
use crate::primitives::{ALPHANUMERIC, MAX_UNIQUE_STRING_RETRIES};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// A source of attribute values.
pub trait ValueProvider: fmt::Debug {
    /// Whether another value may be available.
    fn has_next(&self) -> bool;

    /// The next value, or `None` once the provider is exhausted.
    fn next_value(&mut self, rng: &mut dyn RngCore) -> Option<AttributeValue>;
}

// =============================================================================
// KEY COUNTER
// =============================================================================

/// Shared monotonic counter for globally unique synthetic keys.
///
/// Owned by the schema builder; every strategy that needs run-wide uniqueness
/// holds a clone of the same handle.
#[derive(Debug, Clone, Default)]
pub struct KeyCounter(Rc<Cell<u64>>);

impl KeyCounter {
    /// A counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current key and advance.
    pub fn next_key(&self) -> u64 {
        let key = self.0.get();
        self.0.set(key.saturating_add(1));
        key
    }

    /// Keys handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.0.get()
    }
}

/// Monotonic `Long` values from a shared [`KeyCounter`]. Unbounded.
#[derive(Debug, Clone)]
pub struct CountingValues {
    counter: KeyCounter,
}

impl CountingValues {
    /// Values drawn from `counter`.
    #[must_use]
    pub fn new(counter: KeyCounter) -> Self {
        Self { counter }
    }
}

impl ValueProvider for CountingValues {
    fn has_next(&self) -> bool {
        true
    }

    fn next_value(&mut self, _rng: &mut dyn RngCore) -> Option<AttributeValue> {
        let key = i64::try_from(self.counter.next_key()).ok()?;
        Some(AttributeValue::Long(key))
    }
}

// =============================================================================
// RANDOM STRINGS
// =============================================================================

/// Fixed-length alphanumeric strings.
///
/// With uniqueness on, a collision is retried up to
/// [`MAX_UNIQUE_STRING_RETRIES`] times before the provider gives up for good.
#[derive(Debug, Clone)]
pub struct RandomStrings {
    length: usize,
    limit: Option<usize>,
    issued: Option<BTreeSet<String>>,
    produced: usize,
    exhausted: bool,
}

impl RandomStrings {
    /// Strings of exactly `length` characters.
    pub fn new(length: usize) -> Result<Self, SynthError> {
        if length == 0 {
            return Err(SynthError::InvalidStrategy(
                "random strings need a length of at least 1".to_string(),
            ));
        }
        Ok(Self {
            length,
            limit: None,
            issued: None,
            produced: 0,
            exhausted: false,
        })
    }

    /// Never hand out the same string twice.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.issued = Some(BTreeSet::new());
        self
    }

    /// Hand out at most `limit` strings in total.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn draw(&self, rng: &mut dyn RngCore) -> String {
        (0..self.length)
            .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
            .collect()
    }
}

impl ValueProvider for RandomStrings {
    fn has_next(&self) -> bool {
        !self.exhausted && self.limit.is_none_or(|limit| self.produced < limit)
    }

    fn next_value(&mut self, rng: &mut dyn RngCore) -> Option<AttributeValue> {
        if !self.has_next() {
            return None;
        }

        let value = if self.issued.is_some() {
            let fresh = (0..MAX_UNIQUE_STRING_RETRIES)
                .map(|_| self.draw(rng))
                .find(|s| self.issued.as_ref().is_some_and(|seen| !seen.contains(s)));
            match (fresh, self.issued.as_mut()) {
                (Some(s), Some(seen)) => {
                    seen.insert(s.clone());
                    s
                }
                _ => {
                    tracing::trace!(
                        length = self.length,
                        produced = self.produced,
                        "unique string pool exhausted"
                    );
                    self.exhausted = true;
                    return None;
                }
            }
        } else {
            self.draw(rng)
        };

        self.produced += 1;
        Some(AttributeValue::String(value))
    }
}

// =============================================================================
// SCALING GAUSSIAN
// =============================================================================

/// `z * times_queried * factor`: values spread wider the longer the run goes.
#[derive(Debug, Clone)]
pub struct ScalingGaussianValues {
    factor: f64,
    as_long: bool,
    times_queried: u64,
}

impl ScalingGaussianValues {
    /// `Double` values.
    #[must_use]
    pub fn doubles(factor: f64) -> Self {
        Self {
            factor,
            as_long: false,
            times_queried: 0,
        }
    }

    /// `Long` values, floored.
    #[must_use]
    pub fn longs(factor: f64) -> Self {
        Self {
            factor,
            as_long: true,
            times_queried: 0,
        }
    }
}

impl ValueProvider for ScalingGaussianValues {
    fn has_next(&self) -> bool {
        true
    }

    fn next_value(&mut self, rng: &mut dyn RngCore) -> Option<AttributeValue> {
        self.times_queried = self.times_queried.saturating_add(1);
        let z: f64 = StandardNormal.sample(rng);
        let scaled = z * self.times_queried as f64 * self.factor;
        Some(if self.as_long {
            AttributeValue::Long(scaled.floor() as i64)
        } else {
            AttributeValue::Double(scaled)
        })
    }
}

// =============================================================================
// FIXED AND BOOLEAN VALUES
// =============================================================================

/// A finite list of values, handed out in order.
#[derive(Debug, Clone)]
pub struct FixedValues {
    values: Vec<AttributeValue>,
    position: usize,
}

impl FixedValues {
    /// Provider over `values`.
    #[must_use]
    pub fn new(values: Vec<AttributeValue>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl ValueProvider for FixedValues {
    fn has_next(&self) -> bool {
        self.position < self.values.len()
    }

    fn next_value(&mut self, _rng: &mut dyn RngCore) -> Option<AttributeValue> {
        let value = self.values.get(self.position).cloned()?;
        self.position += 1;
        Some(value)
    }
}

/// Uniformly random booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValues;

impl ValueProvider for BooleanValues {
    fn has_next(&self) -> bool {
        true
    }

    fn next_value(&mut self, rng: &mut dyn RngCore) -> Option<AttributeValue> {
        Some(AttributeValue::Boolean(rng.r#gen()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
