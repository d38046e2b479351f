//! # Sample Context
//!
//! Everything a draw may consult: the run's single seeded random source and
//! a read-only view of concept storage.
//!
//! The context is threaded explicitly through samplers, distributions and
//! providers. There is no ambient RNG anywhere in the engine, so a seed and a
//! deterministic storage fully determine a run.

use crate::storage::ConceptStorage;
use crate::SynthError;
use rand::RngCore;

/// Borrowed random source plus read-only storage for one batch.
pub struct SampleContext<'a> {
    rng: &'a mut dyn RngCore,
    storage: &'a dyn ConceptStorage,
}

impl<'a> SampleContext<'a> {
    /// Create a context over the given random source and storage.
    pub fn new(rng: &'a mut dyn RngCore, storage: &'a dyn ConceptStorage) -> Self {
        Self { rng, storage }
    }

    /// The random source.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// The storage view. The returned reference outlives the borrow of the
    /// context, so it can be held across calls to [`Self::rng`].
    #[must_use]
    pub fn storage(&self) -> &'a dyn ConceptStorage {
        self.storage
    }

    /// Shorthand for the storage's live scale.
    pub fn current_scale(&self) -> Result<u64, SynthError> {
        self.storage.current_scale()
    }
}

impl std::fmt::Debug for SampleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleContext").finish_non_exhaustive()
    }
}
