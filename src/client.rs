use crate::{schema::Schema, storage::Storage};

use std::time;

/// Default ceiling for the table readiness wait.
pub const DEFAULT_READY_TIMEOUT: time::Duration = time::Duration::from_secs(5 * 60);

/// Default delay between two table readiness polls.
pub const DEFAULT_POLL_INTERVAL: time::Duration = time::Duration::from_secs(2);

/// Key-value client bound to one table and one [`Schema`].
///
/// The handle is immutable and cheap to clone; every operation is an
/// independent round-trip to the storage service.
///
/// ```rust,no_run
/// use dynamodb_kvs::{Connection, Schema};
/// use serde_json::json;
///
/// # async fn example() -> dynamodb_kvs::Result<()> {
/// let connection = Connection::new("http://localhost:8000", "key", "secret", "us-east-1");
/// let client = connection.client("t1", Schema::SingleKey).unwrap();
/// client.bootstrap().await?;
/// client.put(42, &json!({"a": 1})).await?;
/// assert_eq!(client.get(42).await?, Some(br#"{"a":1}"#.to_vec()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct KvsClient<S> {
    pub(crate) poll_interval: time::Duration,
    pub(crate) ready_timeout: time::Duration,
    pub(crate) schema: Schema,
    pub(crate) storage: S,
    pub(crate) table_name: String,
}

impl<S: Storage> KvsClient<S> {
    /// Bind `storage` to a table; `None` when `table_name` is empty.
    pub fn new(storage: S, table_name: impl Into<String>, schema: Schema) -> Option<Self> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return None;
        }
        Some(Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            schema,
            storage,
            table_name,
        })
    }

    /// Override the ceiling of the readiness wait performed by [`Self::bootstrap`].
    pub fn with_ready_timeout(mut self, ready_timeout: time::Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    /// Override the delay between two readiness polls.
    pub fn with_poll_interval(mut self, poll_interval: time::Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The table schema.
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The readiness wait ceiling.
    pub fn ready_timeout(&self) -> time::Duration {
        self.ready_timeout
    }
}
