//! Blobs, squares and circles.
//!
//! `interaction` joins one to several concepts of every shape. The
//! `ownership-of-*` and `sizing-*` relations each draw a handful of hub
//! owners from concepts not yet owning anything through that relation.

use super::{hub_role, storage_role};
use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy};
use crate::values::CountingValues;

/// (relation, hub type, hub mean, hub stddev, owned type, count range)
type HubRelation = (&'static str, &'static str, f64, f64, &'static str, (u64, u64));

const HUB_RELATIONS: [HubRelation; 7] = [
    ("ownership-of-blob", "blob", 8.0, 3.0, "blob", (10, 20)),
    ("ownership-of-square", "blob", 12.0, 4.0, "square", (20, 30)),
    ("ownership-of-circle", "circle", 15.0, 5.0, "circle", (25, 35)),
    ("sizing-blob", "blob", 4.0, 2.0, "blob", (5, 13)),
    ("sizing-circle", "blob", 6.0, 2.0, "circle", (4, 10)),
    ("sizing-square", "blob", 4.0, 1.5, "square", (3, 8)),
    ("sizing-square", "circle", 3.0, 1.0, "square", (2, 6)),
];

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let mut builder = SchemaBuilder::new(seed);
    let keys = builder.key_counter();

    for (shape, lo, hi) in [("blob", 8, 18), ("square", 11, 21), ("circle", 16, 26)] {
        builder = builder.entity(
            1.0,
            EntityStrategy::new(shape, CountDistribution::uniform(lo, hi)?)?,
        )?;

        builder = builder.attribute(
            1.0,
            AttributeStrategy::new(
                format!("{}-value", shape),
                CountDistribution::uniform(1, 5)?,
                Box::new(CountingValues::new(keys.clone())),
            )?
            .owned_by(shape, CountDistribution::uniform(2, 8)?)?,
        )?;
    }

    let interaction = RelationStrategy::new(
        "interaction",
        CountDistribution::uniform(45, 75)?,
        vec![
            storage_role("blobber", "blob", CountDistribution::uniform(1, 4)?)?,
            storage_role("circler", "circle", CountDistribution::uniform(1, 11)?)?,
            storage_role("squarer", "square", CountDistribution::uniform(1, 7)?)?,
        ],
    )?;
    builder = builder.relation(1.0, interaction)?;

    for (relation, hub_type, mean, stddev, owned_type, (lo, hi)) in HUB_RELATIONS {
        let (hub, other) = if relation.starts_with("ownership") {
            ("owner", "owned")
        } else {
            ("bigger", "smaller")
        };
        let strategy = RelationStrategy::new(
            relation,
            CountDistribution::uniform(lo, hi)?,
            vec![
                hub_role(
                    hub,
                    hub_type,
                    relation,
                    CountDistribution::discrete_gaussian(mean, stddev)?,
                )?,
                storage_role(other, owned_type, CountDistribution::constant(1))?,
            ],
        )?;
        builder = builder.relation(1.0, strategy)?;
    }

    builder.category_weights(1.0, 8.0, 5.0 / 3.0).build()
}
