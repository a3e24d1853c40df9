use crate::{
    Result,
    client::KvsClient,
    common::item,
    repository,
    schema::{self, Schema},
    storage::Storage,
};

use serde::{Serialize, de::DeserializeOwned};

impl<S: Storage> KvsClient<S> {
    /// Store `value` under `primary_key`, replacing any previous value.
    ///
    /// Only single-key tables accept records without a secondary key; use
    /// [`Self::put_with_secondary`] on secondary-index tables.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.put", skip(self, value), fields(table_name = %self.table_name), err)
    )]
    pub async fn put<V: Serialize + ?Sized>(&self, primary_key: i64, value: &V) -> Result<()> {
        match self.schema {
            Schema::SingleKey => {}
            Schema::SecondaryIndex => return Err(repository::unsupported("put", self.schema)),
        }
        let record = item::ItemRecord::new(primary_key, None, value)?;
        let input = repository::put_item_input(&self.table_name, record);
        self.storage.store_item(input).await
    }

    /// The serialized value stored under `primary_key`.
    ///
    /// Returns `Ok(None)` when nothing is stored under that key, which is
    /// distinct from a stored empty value. On secondary-index tables the
    /// first record with that primary key is returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.get", skip(self), fields(table_name = %self.table_name), err)
    )]
    pub async fn get(&self, primary_key: i64) -> Result<Option<Vec<u8>>> {
        let item = match self.schema {
            Schema::SingleKey => {
                let key = item::RecordKey {
                    primary_key,
                    secondary_key: None,
                };
                let input = repository::get_item_input(&self.table_name, key)?;
                self.storage.fetch_item(input).await?
            }
            Schema::SecondaryIndex => {
                let input = repository::query_input(
                    &self.table_name,
                    None,
                    schema::PRIMARY_KEY,
                    primary_key,
                )?;
                self.storage.query_items(input).await?.into_iter().next()
            }
        };
        item.map(|item| item::ItemRecord::try_from(item).map(|record| record.value))
            .transpose()
    }

    /// The value stored under `primary_key`, deserialized.
    pub async fn get_as<V: DeserializeOwned>(&self, primary_key: i64) -> Result<Option<V>> {
        match self.get(primary_key).await? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, KvsClient, Schema, storage::memory::MemoryStorage};

    use rstest::rstest;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::collections;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
    }

    async fn bootstrapped(schema: Schema) -> KvsClient<MemoryStorage> {
        let client = KvsClient::new(MemoryStorage::new(), "t1", schema).unwrap();
        client.bootstrap().await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_put_get_json() {
        let client = bootstrapped(Schema::SingleKey).await;
        client.put(42, &json!({"a": 1})).await.unwrap();
        let actual = client.get(42).await.unwrap();
        assert_eq!(actual, Some(br#"{"a":1}"#.to_vec()));
    }

    #[rstest]
    #[case::zero(0)]
    #[case::minus_one(-1)]
    #[case::min(i64::MIN)]
    #[case::max(i64::MAX)]
    #[tokio::test]
    async fn test_round_trip(#[case] primary_key: i64) {
        let client = bootstrapped(Schema::SingleKey).await;
        let profile = Profile {
            name: "ada".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };
        client.put(primary_key, &profile).await.unwrap();
        let actual: Option<Profile> = client.get_as(primary_key).await.unwrap();
        assert_eq!(actual, Some(profile));
    }

    #[tokio::test]
    async fn test_overwrite() {
        let client = bootstrapped(Schema::SingleKey).await;
        client.put(1, "first").await.unwrap();
        client.put(1, "second").await.unwrap();
        let actual: Option<String> = client.get_as(1).await.unwrap();
        assert_eq!(actual, Some("second".to_string()));
        assert_eq!(client.storage().items("t1").len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let client = bootstrapped(Schema::SingleKey).await;
        client.put(1, &json!(null)).await.unwrap();
        assert_eq!(client.get(2).await.unwrap(), None);
        assert_eq!(client.get_as::<String>(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_secondary_index_table() {
        let client = bootstrapped(Schema::SecondaryIndex).await;
        client.put_with_secondary(7, 9, &json!([1])).await.unwrap();
        assert_eq!(client.get(7).await.unwrap(), Some(b"[1]".to_vec()));
        assert_eq!(client.get(8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_secondary_index_table() {
        let client = bootstrapped(Schema::SecondaryIndex).await;
        let actual = client.put(1, "value").await;
        assert!(matches!(
            actual,
            Err(Error::UnsupportedOperation {
                operation: "put",
                schema: Schema::SecondaryIndex,
            })
        ));
        assert!(client.storage().items("t1").is_empty());
    }

    #[tokio::test]
    async fn test_put_serialization_failure() {
        let client = bootstrapped(Schema::SingleKey).await;
        let value = collections::HashMap::from([(vec![1u8], 1)]);
        let actual = client.put(1, &value).await;
        assert!(matches!(actual, Err(Error::Serialization(_))));
        assert!(client.storage().items("t1").is_empty());
    }

    #[tokio::test]
    async fn test_get_as_type_mismatch() {
        let client = bootstrapped(Schema::SingleKey).await;
        client.put(1, "text").await.unwrap();
        let actual = client.get_as::<u32>(1).await;
        assert!(matches!(actual, Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_missing_table() {
        let client = KvsClient::new(MemoryStorage::new(), "t1", Schema::SingleKey).unwrap();
        assert!(matches!(client.put(1, "a").await, Err(Error::Storage(_))));
        assert!(matches!(client.get(1).await, Err(Error::Storage(_))));
    }
}
