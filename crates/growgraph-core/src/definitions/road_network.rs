//! Roads joined at intersections.
//!
//! Each intersection batch picks 10 to 40 roads that are not yet an
//! endpoint and reuses them round-robin as the first endpoint, then adds one
//! to five arbitrary roads. Hub roads emerge from that reuse.

use super::{hub_role, storage_role};
use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy};
use crate::values::{CountingValues, RandomStrings};

/// Numeric attributes every road can own.
const NUMERIC_ATTRIBUTES: [&str; 7] = [
    "long-1", "long-2", "long-3", "long-4", "long-5", "long-6", "long-7",
];

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let mut builder = SchemaBuilder::new(seed);
    let keys = builder.key_counter();

    builder = builder.entity(
        1.0,
        EntityStrategy::new("road", CountDistribution::uniform(10, 40)?)?,
    )?;

    builder = builder.attribute(
        1.0,
        AttributeStrategy::new(
            "name",
            CountDistribution::uniform(10, 30)?,
            Box::new(RandomStrings::new(6)?),
        )?
        .owned_by("road", CountDistribution::constant(120))?,
    )?;

    for label in NUMERIC_ATTRIBUTES {
        builder = builder.attribute(
            0.1,
            AttributeStrategy::new(
                label,
                CountDistribution::uniform(10, 30)?,
                Box::new(CountingValues::new(keys.clone())),
            )?
            .owned_by("road", CountDistribution::constant(30))?,
        )?;
    }

    let intersection = RelationStrategy::new(
        "intersection",
        CountDistribution::uniform(20, 100)?,
        vec![
            hub_role(
                "endpoint",
                "road",
                "intersection",
                CountDistribution::uniform(10, 40)?,
            )?,
            storage_role("endpoint", "road", CountDistribution::uniform(1, 5)?)?,
        ],
    )?;

    builder
        .relation(1.0, intersection)?
        .category_weights(1.0, 1.25, 1.0)
        .build()
}
