use crate::{
    Error, Result,
    client::KvsClient,
    common::{self, item},
    repository,
    schema::{self, Schema},
    storage::Storage,
};

use serde::{Serialize, de::DeserializeOwned};

impl<S: Storage> KvsClient<S> {
    /// Store `value` under `primary_key`, tagged with `secondary_key`.
    ///
    /// The pair of keys addresses the record: writing the same pair again
    /// replaces the value. A primary key holds a single record, so a write
    /// that tags an already stored primary key with another secondary key
    /// fails with [`Error::SecondaryKeyConflict`]. The lookup and the write
    /// are separate calls, so two concurrent writers can still both succeed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.put_with_secondary", skip(self, value), fields(table_name = %self.table_name), err)
    )]
    pub async fn put_with_secondary<V: Serialize + ?Sized>(
        &self,
        primary_key: i64,
        secondary_key: i64,
        value: &V,
    ) -> Result<()> {
        match self.schema {
            Schema::SingleKey => {
                return Err(repository::unsupported("put_with_secondary", self.schema));
            }
            Schema::SecondaryIndex => {}
        }
        let record = item::ItemRecord::new(primary_key, Some(secondary_key), value)?;
        self.check_secondary_key(primary_key, secondary_key).await?;
        let input = repository::put_item_input(&self.table_name, record);
        self.storage.store_item(input).await
    }

    /// The serialized values of every record tagged with `secondary_key`.
    ///
    /// Values come back in the index order, which is not otherwise specified.
    /// The index only projects keys, so records returned without their value
    /// are read back from the table by their full key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.get_by_secondary", skip(self), fields(table_name = %self.table_name), err)
    )]
    pub async fn get_by_secondary(&self, secondary_key: i64) -> Result<Vec<Vec<u8>>> {
        match self.schema {
            Schema::SingleKey => {
                return Err(repository::unsupported("get_by_secondary", self.schema));
            }
            Schema::SecondaryIndex => {}
        }
        let input = repository::query_input(
            &self.table_name,
            Some(schema::SECONDARY_INDEX),
            schema::SECONDARY_KEY,
            secondary_key,
        )?;
        let items = self.storage.query_items(input).await?;
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = self.resolve_value(item).await? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// The values of every record tagged with `secondary_key`, deserialized.
    pub async fn get_by_secondary_as<V: DeserializeOwned>(
        &self,
        secondary_key: i64,
    ) -> Result<Vec<V>> {
        self.get_by_secondary(secondary_key)
            .await?
            .iter()
            .map(|value| serde_json::from_slice(value).map_err(Error::from))
            .collect()
    }

    async fn check_secondary_key(&self, primary_key: i64, secondary_key: i64) -> Result<()> {
        let input =
            repository::query_input(&self.table_name, None, schema::PRIMARY_KEY, primary_key)?;
        for item in self.storage.query_items(input).await? {
            let stored = item::RecordKey::try_from(&item)?;
            match stored.secondary_key {
                Some(existing) if existing == secondary_key => {}
                Some(existing) => {
                    return Err(Error::SecondaryKeyConflict {
                        primary_key,
                        existing_secondary_key: existing,
                    });
                }
                None => return Err(Error::MalformedItem(schema::SECONDARY_KEY)),
            }
        }
        Ok(())
    }

    async fn resolve_value(&self, mut item: common::AttributeMap) -> Result<Option<Vec<u8>>> {
        if let Some(value) = item::take_value(&mut item)? {
            return Ok(Some(value));
        }
        let key = item::RecordKey::try_from(&item)?;
        let input = repository::get_item_input(&self.table_name, key)?;
        // None when the record was overwritten or deleted since the index was read
        let item = self.storage.fetch_item(input).await?;
        item.map(|item| item::ItemRecord::try_from(item).map(|record| record.value))
            .transpose()
    }
}
