//! # Weighted Sampler
//!
//! A discrete picker over a fixed, append-only set of weighted items.
//!
//! Each item is drawn with probability `weight / total_weight`. Samplers nest:
//! a schema definition keeps a sampler of category samplers and picks
//! "category, then strategy" with two draws.

use crate::SynthError;
use rand::Rng;

/// One weighted item plus the running total up to and including it.
#[derive(Debug, Clone)]
struct Entry<T> {
    weight: f64,
    cumulative: f64,
    item: T,
}

/// Append-only weighted picker.
#[derive(Debug, Clone)]
pub struct WeightedSampler<T> {
    entries: Vec<Entry<T>>,
    total: f64,
}

impl<T> Default for WeightedSampler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            total: 0.0,
        }
    }
}

impl<T> WeightedSampler<T> {
    /// Create an empty sampler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    ///
    /// Returns `SynthError::InvalidWeight` unless `weight` is positive and
    /// finite; the sampler is left unchanged in that case.
    pub fn add(&mut self, weight: f64, item: T) -> Result<(), SynthError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(SynthError::InvalidWeight(weight));
        }
        self.total += weight;
        self.entries.push(Entry {
            weight,
            cumulative: self.total,
            item,
        });
        Ok(())
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no item has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw the index of an item. `None` only when the sampler is empty.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let draw = rng.r#gen::<f64>() * self.total;
        let index = self
            .entries
            .iter()
            .position(|e| e.cumulative > draw)
            // Rounding can put the draw on the final boundary
            .unwrap_or(self.entries.len() - 1);
        Some(index)
    }

    /// Draw an item.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let index = self.sample_index(rng)?;
        self.entries.get(index).map(|e| &e.item)
    }

    /// Draw an item for mutation (stateful providers live inside strategies).
    pub fn sample_mut<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&mut T> {
        let index = self.sample_index(rng)?;
        self.entries.get_mut(index).map(|e| &mut e.item)
    }

    /// Items with their weights, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.entries.iter().map(|e| (e.weight, &e.item))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_non_positive_weights() {
        let mut sampler = WeightedSampler::new();
        assert!(matches!(
            sampler.add(0.0, "a"),
            Err(SynthError::InvalidWeight(_))
        ));
        assert!(sampler.add(-1.0, "a").is_err());
        assert!(sampler.add(f64::NAN, "a").is_err());
        assert!(sampler.add(f64::INFINITY, "a").is_err());
        assert!(sampler.is_empty());
    }

    #[test]
    fn empty_sampler_yields_nothing() {
        let sampler: WeightedSampler<u8> = WeightedSampler::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sampler.sample(&mut rng).is_none());
    }

    #[test]
    fn single_item_always_drawn() {
        let mut sampler = WeightedSampler::new();
        sampler.add(0.25, "only").expect("add");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng), Some(&"only"));
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let mut sampler = WeightedSampler::new();
        sampler.add(1.0, 0usize).expect("add");
        sampler.add(3.0, 1usize).expect("add");
        sampler.add(6.0, 2usize).expect("add");

        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0u32; 3];
        let draws = 100_000;
        for _ in 0..draws {
            let i = *sampler.sample(&mut rng).expect("sample");
            counts[i] += 1;
        }

        let expected = [0.1, 0.3, 0.6];
        for (count, want) in counts.iter().zip(expected) {
            let got = f64::from(*count) / f64::from(draws);
            assert!((got - want).abs() < 0.01, "got {got}, want {want}");
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let mut sampler = WeightedSampler::new();
        for (w, item) in [(1.0, 'a'), (2.0, 'b'), (0.5, 'c')] {
            sampler.add(w, item).expect("add");
        }

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50)
                .map(|_| *sampler.sample(&mut rng).expect("sample"))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn nested_samplers_pick_category_then_item() {
        let mut left = WeightedSampler::new();
        left.add(1.0, "l1").expect("add");
        let mut right = WeightedSampler::new();
        right.add(1.0, "r1").expect("add");
        right.add(1.0, "r2").expect("add");

        let mut outer = WeightedSampler::new();
        outer.add(1.0, left).expect("add");
        outer.add(1.0, right).expect("add");

        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let inner = outer.sample_mut(&mut rng).expect("outer");
            seen.insert(*inner.sample(&mut rng).expect("inner"));
        }
        assert_eq!(seen.len(), 3);
    }
}
