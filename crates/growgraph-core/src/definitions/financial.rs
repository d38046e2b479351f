//! Traders and transactions.
//!
//! Traders arrive at a rate proportional to the dataset, and every
//! `transaction` binds a scale-dependent number of them. `@has-quantity`
//! attaches quantities to transactions that have none yet.

use super::{storage_role, unowned_role};
use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::primitives::OWNERSHIP_PREFIX;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy};
use crate::values::CountingValues;

const QUANTITY: &str = "quantity";

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let builder = SchemaBuilder::new(seed);
    let keys = builder.key_counter();

    let trader = EntityStrategy::new(
        "trader",
        CountDistribution::scaling_discrete_gaussian(0.02, 0.01)?,
    )?;

    let quantity = AttributeStrategy::new(
        QUANTITY,
        CountDistribution::discrete_gaussian(5.0, 3.0)?,
        Box::new(CountingValues::new(keys)),
    )?;

    let transaction = RelationStrategy::new(
        "transaction",
        CountDistribution::discrete_gaussian(50.0, 10.0)?,
        vec![storage_role(
            "transactor",
            "trader",
            CountDistribution::scaling_discrete_gaussian(0.005, 0.005)?,
        )?],
    )?;

    // Owners are transactions without a quantity; any quantity may be reused
    let relation = format!("{}{}", OWNERSHIP_PREFIX, QUANTITY);
    let has_quantity = RelationStrategy::new(
        relation.as_str(),
        CountDistribution::scaling_discrete_gaussian(0.01, 0.005)?,
        vec![
            unowned_role(&format!("{}-owner", relation), "transaction", &relation)?,
            storage_role(
                &format!("{}-value", relation),
                QUANTITY,
                CountDistribution::constant(1),
            )?,
        ],
    )?;

    builder
        .entity(1.0, trader)?
        .attribute(1.0, quantity)?
        .relation(1.0, transaction)?
        .relation(1.0, has_quantity)?
        .build()
}
