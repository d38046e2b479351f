//! # Instance Generators
//!
//! Turn one sampled strategy into a finite, lazily evaluated batch of
//! creation instructions.
//!
//! - `EntityBatch` yields exactly the sampled count.
//! - `AttributeBatch` yields up to the sampled count, ending early when the
//!   value provider runs dry.
//! - `RelationBatch` checks every role before each instance and ends (or
//!   skips, per [`InfeasiblePolicy`]) when a role cannot be filled.
//!
//! Batches yield `Result<Instruction, SynthError>`. After yielding an error a
//! batch is finished. Early termination through exhaustion is not an error.

use crate::context::SampleContext;
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy, TypeStrategy};
use crate::{ConceptKind, Instruction, RoleBinding, SynthError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// INFEASIBLE POLICY
// =============================================================================

/// What a relation batch does when an instance's roles cannot be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasiblePolicy {
    /// End the batch at the first infeasible instance.
    #[default]
    AbortBatch,
    /// Count the attempt against the target, re-draw the role counts and
    /// keep going.
    SkipInstance,
}

impl InfeasiblePolicy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InfeasiblePolicy::AbortBatch => "abort_batch",
            InfeasiblePolicy::SkipInstance => "skip_instance",
        }
    }
}

impl fmt::Display for InfeasiblePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfeasiblePolicy {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort_batch" => Ok(InfeasiblePolicy::AbortBatch),
            "skip_instance" => Ok(InfeasiblePolicy::SkipInstance),
            other => Err(SynthError::InvalidStrategy(format!(
                "unknown infeasible policy '{}' (expected abort_batch or skip_instance)",
                other
            ))),
        }
    }
}

// =============================================================================
// ENTITY BATCH
// =============================================================================

/// Exactly `target` entity instructions. Never starved.
#[derive(Debug)]
pub struct EntityBatch<'a> {
    type_label: &'a str,
    target: u64,
    produced: u64,
}

impl<'a> EntityBatch<'a> {
    pub fn new(
        strategy: &'a mut EntityStrategy,
        ctx: &mut SampleContext<'_>,
    ) -> Result<Self, SynthError> {
        let target = strategy.count.sample(ctx)?;
        let strategy: &'a EntityStrategy = strategy;
        Ok(Self {
            type_label: &strategy.type_label,
            target,
            produced: 0,
        })
    }

    #[must_use]
    pub fn target(&self) -> u64 {
        self.target
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.produced < self.target
    }
}

impl Iterator for EntityBatch<'_> {
    type Item = Result<Instruction, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        self.produced += 1;
        Some(Ok(Instruction::Entity {
            type_label: self.type_label.to_string(),
        }))
    }
}

// =============================================================================
// ATTRIBUTE BATCH
// =============================================================================

/// Up to `target` attribute instructions; ends when values run out.
#[derive(Debug)]
pub struct AttributeBatch<'a> {
    strategy: &'a mut AttributeStrategy,
    ctx: SampleContext<'a>,
    target: u64,
    produced: u64,
    exhausted: bool,
}

impl<'a> AttributeBatch<'a> {
    pub fn new(
        strategy: &'a mut AttributeStrategy,
        mut ctx: SampleContext<'a>,
    ) -> Result<Self, SynthError> {
        let target = strategy.count.sample(&mut ctx)?;
        Ok(Self {
            strategy,
            ctx,
            target,
            produced: 0,
            exhausted: false,
        })
    }

    #[must_use]
    pub fn target(&self) -> u64 {
        self.target
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.exhausted && self.produced < self.target && self.strategy.values.has_next()
    }
}

impl Iterator for AttributeBatch<'_> {
    type Item = Result<Instruction, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let Some(value) = self.strategy.values.next_value(self.ctx.rng()) else {
            tracing::trace!(
                type_label = %self.strategy.type_label,
                produced = self.produced,
                target = self.target,
                "value provider exhausted"
            );
            self.exhausted = true;
            return None;
        };
        self.produced += 1;
        Some(Ok(Instruction::Attribute {
            type_label: self.strategy.type_label.clone(),
            value,
        }))
    }
}

// =============================================================================
// RELATION BATCH
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Ready,
    Done,
}

/// Relation instructions, one per feasible instance, up to `target`.
///
/// An instance is feasible when every role-player strategy's next count `r`
/// is positive and its provider can supply `r` identifiers. Under
/// [`InfeasiblePolicy::AbortBatch`] the first infeasible instance ends the
/// batch, so the output never has gaps.
#[derive(Debug)]
pub struct RelationBatch<'a> {
    strategy: &'a mut RelationStrategy,
    ctx: SampleContext<'a>,
    policy: InfeasiblePolicy,
    target: u64,
    attempts: u64,
    emitted: u64,
    state: BatchState,
}

impl<'a> RelationBatch<'a> {
    /// Start a batch: every role provider begins a new batch, then the
    /// target count is drawn.
    pub fn new(
        strategy: &'a mut RelationStrategy,
        mut ctx: SampleContext<'a>,
        policy: InfeasiblePolicy,
    ) -> Result<Self, SynthError> {
        for role_player in &mut strategy.role_players {
            role_player.provider.reset_uniqueness();
        }
        let target = strategy.count.sample(&mut ctx)?;
        tracing::trace!(
            type_label = %strategy.type_label,
            roles = strategy.role_players.len(),
            target,
            "relation batch"
        );
        Ok(Self {
            strategy,
            ctx,
            policy,
            target,
            attempts: 0,
            emitted: 0,
            state: BatchState::Ready,
        })
    }

    #[must_use]
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Instances emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn is_feasible(&mut self) -> Result<bool, SynthError> {
        for role_player in &mut self.strategy.role_players {
            let required = role_player.count.peek(&mut self.ctx)?;
            if required == 0 || !role_player.provider.has_next_n(required, &mut self.ctx)? {
                tracing::trace!(
                    relation = %self.strategy.type_label,
                    role = %role_player.role_label,
                    required,
                    "role cannot be filled"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn build_instance(&mut self) -> Result<Instruction, SynthError> {
        let mut role_bindings = Vec::new();
        for role_player in &mut self.strategy.role_players {
            let required = role_player.count.sample(&mut self.ctx)?;
            for _ in 0..required {
                let player = role_player.provider.next(&mut self.ctx)?;
                role_bindings.push(RoleBinding::new(role_player.role_label.clone(), player));
            }
        }
        Ok(Instruction::Relation {
            type_label: self.strategy.type_label.clone(),
            role_bindings,
        })
    }

    fn finish_with_error(&mut self, err: SynthError) -> Option<Result<Instruction, SynthError>> {
        self.state = BatchState::Done;
        Some(Err(err))
    }
}

impl Iterator for RelationBatch<'_> {
    type Item = Result<Instruction, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == BatchState::Done || self.attempts >= self.target {
                self.state = BatchState::Done;
                return None;
            }
            self.attempts += 1;

            match self.is_feasible() {
                Err(e) => return self.finish_with_error(e),
                Ok(true) => {
                    return match self.build_instance() {
                        Ok(instruction) => {
                            self.emitted += 1;
                            Some(Ok(instruction))
                        }
                        Err(e) => self.finish_with_error(e),
                    };
                }
                Ok(false) => match self.policy {
                    InfeasiblePolicy::AbortBatch => {
                        self.state = BatchState::Done;
                        return None;
                    }
                    InfeasiblePolicy::SkipInstance => {
                        for role_player in &mut self.strategy.role_players {
                            role_player.count.discard_peek();
                        }
                    }
                },
            }
        }
    }
}

// =============================================================================
// BATCH DISPATCH
// =============================================================================

/// A batch of any kind, dispatched from a sampled [`TypeStrategy`].
#[derive(Debug)]
pub enum Batch<'a> {
    Entity(EntityBatch<'a>),
    Attribute(AttributeBatch<'a>),
    Relation(RelationBatch<'a>),
}

impl<'a> Batch<'a> {
    /// Start the generator matching the strategy's kind.
    pub fn new(
        strategy: &'a mut TypeStrategy,
        mut ctx: SampleContext<'a>,
        policy: InfeasiblePolicy,
    ) -> Result<Self, SynthError> {
        Ok(match strategy {
            TypeStrategy::Entity(s) => Batch::Entity(EntityBatch::new(s, &mut ctx)?),
            TypeStrategy::Attribute(s) => Batch::Attribute(AttributeBatch::new(s, ctx)?),
            TypeStrategy::Relation(s) => Batch::Relation(RelationBatch::new(s, ctx, policy)?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ConceptKind {
        match self {
            Batch::Entity(_) => ConceptKind::Entity,
            Batch::Attribute(_) => ConceptKind::Attribute,
            Batch::Relation(_) => ConceptKind::Relation,
        }
    }

    /// The sampled target count.
    #[must_use]
    pub fn target(&self) -> u64 {
        match self {
            Batch::Entity(b) => b.target(),
            Batch::Attribute(b) => b.target(),
            Batch::Relation(b) => b.target(),
        }
    }
}

impl Iterator for Batch<'_> {
    type Item = Result<Instruction, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Batch::Entity(b) => b.next(),
            Batch::Attribute(b) => b.next(),
            Batch::Relation(b) => b.next(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
