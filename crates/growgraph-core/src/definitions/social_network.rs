//! People and pages. Friendship counts follow a Zipf whose range grows with
//! the dataset, which gives the heavy-tailed degree distribution.

use super::storage_role;
use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy};
use crate::values::RandomStrings;

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let person = EntityStrategy::new("person", CountDistribution::discrete_gaussian(25.0, 10.0)?)?;
    let page = EntityStrategy::new("page", CountDistribution::discrete_gaussian(5.0, 1.0)?)?;

    let name = AttributeStrategy::new(
        "name",
        CountDistribution::discrete_gaussian(18.0, 3.0)?,
        Box::new(RandomStrings::new(6)?),
    )?
    .owned_by("person", CountDistribution::scaling_discrete_gaussian(0.1, 0.03)?)?;

    // Two independent `friend` fillers make each friendship a pair
    let friendship = RelationStrategy::new(
        "friendship",
        CountDistribution::scaling_bounded_zipf(0.5, 2.3)?,
        vec![
            storage_role("friend", "person", CountDistribution::constant(1))?,
            storage_role("friend", "person", CountDistribution::constant(1))?,
        ],
    )?;

    let likes = RelationStrategy::new(
        "likes",
        CountDistribution::scaling_discrete_gaussian(0.05, 0.001)?,
        vec![
            storage_role("liked", "page", CountDistribution::constant(1))?,
            storage_role("liker", "person", CountDistribution::constant(1))?,
        ],
    )?;

    SchemaBuilder::new(seed)
        .entity(1.0, person)?
        .entity(1.0, page)?
        .attribute(1.0, name)?
        .relation(1.0, friendship)?
        .relation(1.0, likes)?
        .category_weights(1.0, 1.2, 1.0)
        .build()
}
