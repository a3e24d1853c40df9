use crate::{client::KvsClient, schema::Schema};

use aws_sdk_dynamodb::{
    Client, Config,
    config::{BehaviorVersion, Credentials, Region},
};
use serde::Deserialize;
use std::{fmt, time};

const CREDENTIALS_PROVIDER: &str = "dynamodb-kvs";

fn default_ready_timeout_secs() -> u64 {
    crate::client::DEFAULT_READY_TIMEOUT.as_secs()
}

fn default_poll_interval_secs() -> u64 {
    crate::client::DEFAULT_POLL_INTERVAL.as_secs()
}

/// Connection parameters of the storage service.
///
/// The configuration is explicit: nothing is read from the environment or from
/// shared profile files, so two connections never interfere.
///
/// ```rust
/// use dynamodb_kvs::Connection;
///
/// let connection: Connection = serde_json::from_str(
///     r#"{
///         "endpoint": "http://localhost:8000",
///         "access_key_id": "key",
///         "secret_access_key": "secret",
///         "region": "us-east-1"
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(connection.ready_timeout_secs, 300);
/// ```
#[derive(Clone, Deserialize, Eq, PartialEq)]
pub struct Connection {
    /// Endpoint override, e.g. a local DynamoDB; the regional AWS endpoint when `None`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region.
    pub region: String,
    /// Ceiling of the table readiness wait, in seconds.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
    /// Delay between two table readiness polls, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl Connection {
    /// Connection to `endpoint` with static credentials.
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            ready_timeout_secs: default_ready_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }

    /// SDK configuration for this connection.
    pub fn sdk_config(&self) -> Config {
        let credentials = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let builder = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(self.region.clone()));
        match &self.endpoint {
            Some(endpoint) => builder.endpoint_url(endpoint).build(),
            None => builder.build(),
        }
    }

    /// Client handle for `table_name`; `None` when the name is empty.
    pub fn client(&self, table_name: &str, schema: Schema) -> Option<KvsClient<Client>> {
        let client = KvsClient::new(Client::from_conf(self.sdk_config()), table_name, schema)?
            .with_ready_timeout(time::Duration::from_secs(self.ready_timeout_secs))
            .with_poll_interval(time::Duration::from_secs(self.poll_interval_secs));
        Some(client)
    }
}
