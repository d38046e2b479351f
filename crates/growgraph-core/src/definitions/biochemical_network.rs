//! Chemicals and enzymes.
//!
//! `interaction` binds a growing number of chemical agents and a few enzyme
//! catalysts; both role counts are fractions of the live scale, so
//! interactions get wider as the network grows. Chemicals and enzymes share
//! one `biochem-id` attribute through one `@has-biochem-id` relation per
//! owner type, drawing from owners and ids not yet bound.

use super::{storage_role, unowned_role};
use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::primitives::OWNERSHIP_PREFIX;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy};
use crate::values::CountingValues;

const ID_ATTRIBUTE: &str = "biochem-id";

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let mut builder = SchemaBuilder::new(seed);
    let keys = builder.key_counter();

    builder = builder
        .entity(
            1.0,
            EntityStrategy::new("chemical", CountDistribution::discrete_gaussian(11.0, 5.0)?)?,
        )?
        .entity(
            1.0,
            EntityStrategy::new("enzyme", CountDistribution::discrete_gaussian(5.0, 0.8)?)?,
        )?
        .attribute(
            1.0,
            AttributeStrategy::new(
                ID_ATTRIBUTE,
                CountDistribution::discrete_gaussian(5.0, 3.0)?,
                Box::new(CountingValues::new(keys)),
            )?,
        )?;

    let interaction = RelationStrategy::new(
        "interaction",
        CountDistribution::discrete_gaussian(50.0, 25.0)?,
        vec![
            storage_role(
                "agent",
                "chemical",
                CountDistribution::scaling_discrete_gaussian(0.01, 0.005)?,
            )?,
            storage_role(
                "catalyst",
                "enzyme",
                CountDistribution::scaling_discrete_gaussian(0.001, 0.001)?,
            )?,
        ],
    )?;
    builder = builder.relation(3.0, interaction)?;

    // One ownership relation per owner type, both under the same label
    let relation = format!("{}{}", OWNERSHIP_PREFIX, ID_ATTRIBUTE);
    let owner_role = format!("{}-owner", relation);
    let value_role = format!("{}-value", relation);
    for owner_type in ["chemical", "enzyme"] {
        let ownership = RelationStrategy::new(
            relation.as_str(),
            CountDistribution::discrete_gaussian(22.0, 6.0)?,
            vec![
                unowned_role(&owner_role, owner_type, &relation)?,
                unowned_role(&value_role, ID_ATTRIBUTE, &relation)?,
            ],
        )?;
        builder = builder.relation(1.0, ownership)?;
    }

    builder.build()
}
