//! Common utilities for key-value operations.
//!
//! This module provides the pieces shared by the lifecycle manager and the
//! repositories: key encoding, key condition expressions, and the conversion
//! between item records and DynamoDB attribute maps.

/// Equality key conditions for index queries.
pub mod condition;

/// Item records as stored in the table.
pub mod item;

/// Integer key encoding and key attribute maps.
pub mod key;

use aws_sdk_dynamodb::types;
use std::collections;

/// DynamoDB attribute map.
pub type AttributeMap = collections::HashMap<String, types::AttributeValue>;

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionInput {
    /// The expression string, with `#name` and `:value` placeholders.
    pub expression: String,
    /// Placeholder to attribute name substitutions.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Placeholder to attribute value substitutions.
    pub expression_attribute_values: AttributeMap,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = if operation.expression.is_empty() {
                item.expression
            } else {
                format!("{}{operator}{}", operation.expression, item.expression)
            };
        }
        operation
    }
}
