use crate::{Result, common};

use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Equality condition on a key attribute.
///
/// Key conditions are the only conditions queries need: lookups are always
/// by exact key, never by range.
///
/// ```rust
/// use dynamodb_kvs::common::condition;
///
/// let condition = condition::KeyCondition {
///     name: "secondary_key".to_string(),
///     value: "9".to_string(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition<T> {
    /// The name of the key attribute.
    pub name: String,
    /// The value the attribute must be equal to.
    pub value: T,
}

impl<T: Serialize> KeyCondition<T> {
    /// Build the `AND`-joined key condition expression for `conditions`.
    pub fn get_expression_operation(conditions: Vec<Self>) -> Result<common::ExpressionInput> {
        let mut operations = Vec::with_capacity(conditions.len());
        for (index, condition) in conditions.into_iter().enumerate() {
            let value = to_attribute_value(condition.value)?;
            let key_placeholder = format!("#{}", condition.name);
            let value_placeholder = format!(":{}_eq{}", condition.name, index);
            operations.push(common::ExpressionInput {
                expression: format!("{key_placeholder} = {value_placeholder}"),
                expression_attribute_names: collections::HashMap::from([(
                    key_placeholder,
                    condition.name,
                )]),
                expression_attribute_values: common::AttributeMap::from([(
                    value_placeholder,
                    value,
                )]),
            });
        }
        Ok(common::ExpressionInput::merge(" AND ", operations))
    }
}
