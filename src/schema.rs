use crate::{Result, storage};

use aws_sdk_dynamodb::types;
use serde::Deserialize;
use std::fmt;

/// Attribute holding the decimal-encoded primary key.
pub const PRIMARY_KEY: &str = "primary_key";

/// Attribute holding the decimal-encoded secondary key.
pub const SECONDARY_KEY: &str = "secondary_key";

/// Attribute holding the serialized value.
pub const VALUE: &str = "value";

/// Name of the global index partitioned by [`SECONDARY_KEY`].
pub const SECONDARY_INDEX: &str = "secondary_key_index";

/// Read and write capacity units provisioned for the table and its index.
pub const CAPACITY_UNITS: i64 = 10;

/// Shape of the table a client handle is bound to.
///
/// ```rust
/// use dynamodb_kvs::Schema;
///
/// assert_eq!(Schema::SecondaryIndex.to_string(), "secondary-index");
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Schema {
    /// `primary_key` is the only key attribute.
    SingleKey,
    /// `primary_key` and `secondary_key` form the composite key, and a global
    /// index partitioned by `secondary_key` projects the key attributes.
    SecondaryIndex,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleKey => f.write_str("single-key"),
            Self::SecondaryIndex => f.write_str("secondary-index"),
        }
    }
}

fn string_attribute(name: &str) -> Result<types::AttributeDefinition> {
    let definition = types::AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(types::ScalarAttributeType::S)
        .build()?;
    Ok(definition)
}

fn key_element(name: &str, key_type: types::KeyType) -> Result<types::KeySchemaElement> {
    let element = types::KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()?;
    Ok(element)
}

fn provisioned_throughput() -> Result<types::ProvisionedThroughput> {
    let throughput = types::ProvisionedThroughput::builder()
        .read_capacity_units(CAPACITY_UNITS)
        .write_capacity_units(CAPACITY_UNITS)
        .build()?;
    Ok(throughput)
}

impl Schema {
    /// Build the create-table request matching this schema.
    pub fn create_table_input(self, table_name: &str) -> Result<storage::CreateTableInput> {
        let (attribute_definitions, key_schema, global_secondary_indexes) = match self {
            Self::SingleKey => (
                vec![string_attribute(PRIMARY_KEY)?],
                vec![key_element(PRIMARY_KEY, types::KeyType::Hash)?],
                None,
            ),
            Self::SecondaryIndex => {
                let index = types::GlobalSecondaryIndex::builder()
                    .index_name(SECONDARY_INDEX)
                    .key_schema(key_element(SECONDARY_KEY, types::KeyType::Hash)?)
                    .projection(
                        types::Projection::builder()
                            .projection_type(types::ProjectionType::KeysOnly)
                            .build(),
                    )
                    .provisioned_throughput(provisioned_throughput()?)
                    .build()?;
                (
                    vec![
                        string_attribute(PRIMARY_KEY)?,
                        string_attribute(SECONDARY_KEY)?,
                    ],
                    vec![
                        key_element(PRIMARY_KEY, types::KeyType::Hash)?,
                        key_element(SECONDARY_KEY, types::KeyType::Range)?,
                    ],
                    Some(vec![index]),
                )
            }
        };
        let input = storage::CreateTableInput {
            attribute_definitions,
            global_secondary_indexes,
            key_schema,
            provisioned_throughput: provisioned_throughput()?,
            table_name: table_name.to_string(),
        };
        Ok(input)
    }
}
