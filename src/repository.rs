//! Repositories reading and writing item records.
//!
//! Records are always addressed by integer keys encoded as decimal strings,
//! and values are stored as their JSON serialization.

/// Put and get by primary key.
pub mod primary;

/// Put with a secondary key, and query by secondary key through the index.
pub mod secondary;

use crate::{
    Error, Result,
    common::{condition, item, key},
    schema::Schema,
    storage,
};

fn unsupported(operation: &'static str, schema: Schema) -> Error {
    Error::UnsupportedOperation { operation, schema }
}

fn put_item_input(table_name: &str, record: item::ItemRecord) -> storage::PutItemInput {
    storage::PutItemInput {
        item: record.into(),
        table_name: table_name.to_string(),
    }
}

fn get_item_input(table_name: &str, key: item::RecordKey) -> Result<storage::GetItemInput> {
    let input = storage::GetItemInput {
        key: key.into_attribute_map()?,
        table_name: table_name.to_string(),
    };
    Ok(input)
}

/// Query for the records whose `name` attribute equals `value`, on the base
/// table or on `index_name`.
fn query_input(
    table_name: &str,
    index_name: Option<&str>,
    name: &str,
    value: i64,
) -> Result<storage::QueryInput> {
    let key_condition = condition::KeyCondition {
        name: name.to_string(),
        value: key::encode(value),
    };
    let operation = condition::KeyCondition::get_expression_operation(vec![key_condition])?;
    let input = storage::QueryInput {
        expression_attribute_names: operation.expression_attribute_names,
        expression_attribute_values: operation.expression_attribute_values,
        index_name: index_name.map(str::to_string),
        key_condition_expression: operation.expression,
        table_name: table_name.to_string(),
    };
    Ok(input)
}
