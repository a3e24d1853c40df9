//! The storage capability contract.
//!
//! Everything the key-value client needs from the storage service goes through
//! the [`Storage`] trait: table creation and description, single-item reads and
//! writes, and key-condition queries. It is implemented for the DynamoDB
//! [`Client`], and by [`memory::MemoryStorage`] for tests.

/// In-memory storage backend.
pub mod memory;

use crate::{Error, Result, common};

use aws_sdk_dynamodb::{
    Client,
    error::SdkError,
    operation::{create_table::CreateTableError, describe_table::DescribeTableError},
    types,
};
use std::{collections, fmt, future::Future};

/// Create table request.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateTableInput {
    /// Definitions of the key attributes of the table and its indexes.
    pub attribute_definitions: Vec<types::AttributeDefinition>,
    /// Global secondary indexes to create alongside the table.
    pub global_secondary_indexes: Option<Vec<types::GlobalSecondaryIndex>>,
    /// The key schema of the table.
    pub key_schema: Vec<types::KeySchemaElement>,
    /// The provisioned capacity of the table.
    pub provisioned_throughput: types::ProvisionedThroughput,
    /// The table name.
    pub table_name: String,
}

/// Get item request.
#[derive(Clone, Debug, PartialEq)]
pub struct GetItemInput {
    /// The full key of the item.
    pub key: common::AttributeMap,
    /// The table name.
    pub table_name: String,
}

/// Put item request.
#[derive(Clone, Debug, PartialEq)]
pub struct PutItemInput {
    /// The item, replacing any item with the same key.
    pub item: common::AttributeMap,
    /// The table name.
    pub table_name: String,
}

/// Query request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryInput {
    /// Placeholder to attribute name substitutions.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Placeholder to attribute value substitutions.
    pub expression_attribute_values: common::AttributeMap,
    /// The index to query; the base table when `None`.
    pub index_name: Option<String>,
    /// The key condition expression.
    pub key_condition_expression: String,
    /// The table name.
    pub table_name: String,
}

/// Status of a table and of its global secondary indexes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableState {
    /// Status of each global secondary index.
    pub index_statuses: Vec<types::IndexStatus>,
    /// The table status, when reported.
    pub status: Option<types::TableStatus>,
}

impl TableState {
    /// Whether the table and all its indexes can serve traffic.
    pub fn is_active(&self) -> bool {
        self.status == Some(types::TableStatus::Active)
            && self
                .index_statuses
                .iter()
                .all(|status| *status == types::IndexStatus::Active)
    }
}

/// Operations the key-value client consumes from the storage service.
///
/// Implementations classify service errors: a missing table is reported as
/// [`Error::TableNotFound`], creating a table that already exists as
/// [`Error::TableAlreadyExists`], and anything else as [`Error::Storage`].
pub trait Storage: Send + Sync {
    /// Create a table.
    fn provision_table(&self, input: CreateTableInput) -> impl Future<Output = Result<()>> + Send;

    /// Describe the status of a table.
    fn table_state(&self, table_name: &str) -> impl Future<Output = Result<TableState>> + Send;

    /// Read a single item by its full key; `None` when no item has that key.
    fn fetch_item(
        &self,
        input: GetItemInput,
    ) -> impl Future<Output = Result<Option<common::AttributeMap>>> + Send;

    /// Write a single item, replacing any item with the same key.
    fn store_item(&self, input: PutItemInput) -> impl Future<Output = Result<()>> + Send;

    /// Return every item matching the key condition, across all result pages.
    fn query_items(
        &self,
        input: QueryInput,
    ) -> impl Future<Output = Result<Vec<common::AttributeMap>>> + Send;
}

/// Map a CreateTable SDK error, reporting an existing table as [`Error::TableAlreadyExists`].
pub(crate) fn map_create_table_error<R>(
    error: SdkError<CreateTableError, R>,
    table_name: String,
) -> Error
where
    R: fmt::Debug + Send + Sync + 'static,
{
    match error.as_service_error() {
        Some(CreateTableError::ResourceInUseException(_)) => Error::TableAlreadyExists { table_name },
        _ => Error::storage(error),
    }
}

/// Map a DescribeTable SDK error, reporting a missing table as [`Error::TableNotFound`].
pub(crate) fn map_describe_table_error<R>(
    error: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> Error
where
    R: fmt::Debug + Send + Sync + 'static,
{
    match error.as_service_error() {
        Some(DescribeTableError::ResourceNotFoundException(_)) => Error::TableNotFound {
            table_name: table_name.to_string(),
        },
        _ => Error::storage(error),
    }
}

impl Storage for Client {
    async fn provision_table(&self, input: CreateTableInput) -> Result<()> {
        let table_name = input.table_name.clone();
        let result = self
            .create_table()
            .set_attribute_definitions(Some(input.attribute_definitions))
            .set_global_secondary_indexes(input.global_secondary_indexes)
            .set_key_schema(Some(input.key_schema))
            .provisioned_throughput(input.provisioned_throughput)
            .table_name(input.table_name)
            .send()
            .await;
        result
            .map(|_| ())
            .map_err(|error| map_create_table_error(error, table_name))
    }

    async fn table_state(&self, table_name: &str) -> Result<TableState> {
        let result = self.describe_table().table_name(table_name).send().await;
        match result {
            Ok(output) => {
                let state = match output.table {
                    Some(table) => TableState {
                        index_statuses: table
                            .global_secondary_indexes
                            .unwrap_or_default()
                            .into_iter()
                            .filter_map(|index| index.index_status)
                            .collect(),
                        status: table.table_status,
                    },
                    None => TableState::default(),
                };
                Ok(state)
            }
            Err(error) => Err(map_describe_table_error(error, table_name)),
        }
    }

    async fn fetch_item(&self, input: GetItemInput) -> Result<Option<common::AttributeMap>> {
        let output = self
            .get_item()
            .set_key(Some(input.key))
            .table_name(input.table_name)
            .send()
            .await
            .map_err(Error::storage)?;
        Ok(output.item)
    }

    async fn store_item(&self, input: PutItemInput) -> Result<()> {
        self.put_item()
            .set_item(Some(input.item))
            .table_name(input.table_name)
            .send()
            .await
            .map_err(Error::storage)?;
        Ok(())
    }

    async fn query_items(&self, input: QueryInput) -> Result<Vec<common::AttributeMap>> {
        let mut paginator = self
            .query()
            .set_expression_attribute_names(Some(input.expression_attribute_names))
            .set_expression_attribute_values(Some(input.expression_attribute_values))
            .set_index_name(input.index_name)
            .key_condition_expression(input.key_condition_expression)
            .table_name(input.table_name)
            .into_paginator()
            .send();
        let mut items = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.map_err(Error::storage)?;
            if let Some(page_items) = page.items {
                items.extend(page_items);
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::active(
        TableState {
            index_statuses: vec![types::IndexStatus::Active],
            status: Some(types::TableStatus::Active),
        },
        true
    )]
    #[case::no_indexes(
        TableState {
            status: Some(types::TableStatus::Active),
            ..Default::default()
        },
        true
    )]
    #[case::table_creating(
        TableState {
            status: Some(types::TableStatus::Creating),
            ..Default::default()
        },
        false
    )]
    #[case::index_creating(
        TableState {
            index_statuses: vec![types::IndexStatus::Creating],
            status: Some(types::TableStatus::Active),
        },
        false
    )]
    #[case::unknown(TableState::default(), false)]
    fn test_table_state_is_active(#[case] state: TableState, #[case] expected: bool) {
        assert_eq!(state.is_active(), expected);
    }

    #[rstest]
    #[case::resource_not_found(
        SdkError::service_error(
            DescribeTableError::ResourceNotFoundException(
                types::error::ResourceNotFoundException::builder().build()
            ),
            (),
        ),
        true
    )]
    #[case::internal_server_error(
        SdkError::service_error(
            DescribeTableError::InternalServerError(
                types::error::InternalServerError::builder().build()
            ),
            (),
        ),
        false
    )]
    #[case::timeout(SdkError::timeout_error("timed out"), false)]
    fn test_map_describe_table_error(
        #[case] error: SdkError<DescribeTableError, ()>,
        #[case] not_found: bool,
    ) {
        let actual = map_describe_table_error(error, "t");
        if not_found {
            assert!(matches!(actual, Error::TableNotFound { table_name } if table_name == "t"));
        } else {
            assert!(matches!(actual, Error::Storage(_)));
        }
    }

    #[rstest]
    #[case::resource_in_use(
        SdkError::service_error(
            CreateTableError::ResourceInUseException(
                types::error::ResourceInUseException::builder().build()
            ),
            (),
        ),
        true
    )]
    #[case::limit_exceeded(
        SdkError::service_error(
            CreateTableError::LimitExceededException(
                types::error::LimitExceededException::builder().build()
            ),
            (),
        ),
        false
    )]
    #[case::timeout(SdkError::timeout_error("timed out"), false)]
    fn test_map_create_table_error(
        #[case] error: SdkError<CreateTableError, ()>,
        #[case] already_exists: bool,
    ) {
        let actual = map_create_table_error(error, "t".to_string());
        if already_exists {
            assert!(matches!(actual, Error::TableAlreadyExists { table_name } if table_name == "t"));
        } else {
            assert!(matches!(actual, Error::Storage(_)));
        }
    }
}
