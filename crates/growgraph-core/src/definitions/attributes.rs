//! Attribute values only. One strategy per value provider.

use crate::distribution::CountDistribution;
use crate::schema::{SchemaBuilder, SchemaDefinition};
use crate::strategy::AttributeStrategy;
use crate::values::{
    BooleanValues, CountingValues, FixedValues, RandomStrings, ScalingGaussianValues,
};
use crate::{AttributeValue, SynthError};

pub(super) fn definition(seed: u64) -> Result<SchemaDefinition, SynthError> {
    let builder = SchemaBuilder::new(seed);
    let keys = builder.key_counter();

    let levels = ["low", "medium", "high"]
        .into_iter()
        .map(|level| AttributeValue::String(level.to_string()))
        .collect();

    builder
        .attribute(
            1.0,
            AttributeStrategy::new(
                "name",
                CountDistribution::discrete_gaussian(10.0, 3.0)?,
                Box::new(RandomStrings::new(6)?),
            )?,
        )?
        .attribute(
            1.0,
            AttributeStrategy::new(
                "decimal",
                CountDistribution::discrete_gaussian(20.0, 5.0)?,
                Box::new(ScalingGaussianValues::doubles(1.0)),
            )?,
        )?
        .attribute(
            2.0,
            AttributeStrategy::new(
                "serial",
                CountDistribution::discrete_gaussian(50.0, 20.0)?,
                Box::new(CountingValues::new(keys)),
            )?,
        )?
        .attribute(
            2.0,
            AttributeStrategy::new(
                "drift",
                CountDistribution::discrete_gaussian(20.0, 10.0)?,
                Box::new(ScalingGaussianValues::longs(0.2)),
            )?,
        )?
        .attribute(
            1.0,
            AttributeStrategy::new(
                "code",
                CountDistribution::discrete_gaussian(25.0, 10.0)?,
                Box::new(RandomStrings::new(3)?.unique()),
            )?,
        )?
        .attribute(
            1.0,
            AttributeStrategy::new(
                "flag",
                CountDistribution::discrete_gaussian(25.0, 10.0)?,
                Box::new(BooleanValues),
            )?,
        )?
        .attribute(
            0.5,
            AttributeStrategy::new(
                "level",
                CountDistribution::constant(3),
                Box::new(FixedValues::new(levels)),
            )?,
        )?
        .build()
}
