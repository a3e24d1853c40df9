use crate::schema::Schema;

use std::time;
use thiserror::Error;

/// Boxed error returned by the storage service.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the key-value client.
#[derive(Debug, Error)]
pub enum Error {
    /// A request could not be assembled from its parts.
    #[error("failed to build request: {0}")]
    Build(#[from] aws_sdk_dynamodb::error::BuildError),
    /// An attribute could not be converted to or from its DynamoDB representation.
    #[error("failed to convert attribute: {0}")]
    Item(#[from] serde_dynamo::Error),
    /// A stored key is not the canonical decimal form of a 64-bit signed integer.
    #[error("invalid key encoding {0:?}")]
    KeyEncoding(String),
    /// A stored record is missing a required attribute or carries the wrong attribute type.
    #[error("malformed item record: attribute `{0}` is missing or has the wrong type")]
    MalformedItem(&'static str),
    /// The table did not become active before the readiness ceiling elapsed.
    #[error("table {table_name} was not active after {timeout:?}")]
    ReadyTimeout {
        /// The table being waited on.
        table_name: String,
        /// The ceiling that elapsed.
        timeout: time::Duration,
    },
    /// The primary key is already stored under another secondary key.
    #[error("primary key {primary_key} is already stored with secondary key {existing_secondary_key}")]
    SecondaryKeyConflict {
        /// The primary key of the rejected write.
        primary_key: i64,
        /// The secondary key the stored record carries.
        existing_secondary_key: i64,
    },
    /// A caller value could not be serialized, or a stored value could not be deserialized.
    #[error("failed to encode value: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The storage call failed; the underlying service error is kept as the source.
    #[error("storage call failed: {0}")]
    Storage(#[source] BoxError),
    /// The table already exists (returned by table creation).
    #[error("table {table_name} already exists")]
    TableAlreadyExists {
        /// The table name.
        table_name: String,
    },
    /// Table creation was rejected.
    #[error("couldn't create table {table_name}: {source}")]
    TableCreation {
        /// The table name.
        table_name: String,
        /// Why the creation failed.
        #[source]
        source: Box<Error>,
    },
    /// The table does not exist.
    #[error("table {table_name} does not exist")]
    TableNotFound {
        /// The table name.
        table_name: String,
    },
    /// The operation does not apply to the schema the client handle is bound to.
    #[error("operation `{operation}` is not supported by a {schema} table")]
    UnsupportedOperation {
        /// The rejected operation.
        operation: &'static str,
        /// The schema of the client handle.
        schema: Schema,
    },
}

impl Error {
    /// Wrap an arbitrary service error.
    pub fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(error))
    }
}
