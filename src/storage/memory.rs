use crate::{
    Error, Result, common,
    storage::{CreateTableInput, GetItemInput, PutItemInput, QueryInput, Storage, TableState},
};

use aws_sdk_dynamodb::types;
use std::{collections, sync};

#[derive(Debug)]
struct MemoryTable {
    definition: CreateTableInput,
    items: Vec<common::AttributeMap>,
    pending_polls: u32,
}

impl MemoryTable {
    fn key_names(&self) -> impl Iterator<Item = &str> {
        self.definition
            .key_schema
            .iter()
            .map(|element| element.attribute_name())
    }

    fn has_key(&self, item: &common::AttributeMap, key: &common::AttributeMap) -> bool {
        self.key_names()
            .all(|name| item.get(name).is_some() && item.get(name) == key.get(name))
    }

    fn validate_key(&self, key: &common::AttributeMap, exact: bool) -> Result<()> {
        let mut count = 0;
        for name in self.key_names() {
            match key.get(name) {
                Some(types::AttributeValue::S(_)) => count += 1,
                _ => {
                    return Err(Error::Storage(
                        format!("missing or invalid key attribute `{name}`").into(),
                    ));
                }
            }
        }
        if exact && key.len() != count {
            return Err(Error::Storage(
                "the provided key element does not match the schema".into(),
            ));
        }
        Ok(())
    }

    fn projected(
        &self,
        index: &types::GlobalSecondaryIndex,
        item: &common::AttributeMap,
    ) -> common::AttributeMap {
        let projection = index.projection();
        let retained: Option<Vec<&str>> =
            match projection.and_then(|projection| projection.projection_type()) {
                Some(types::ProjectionType::KeysOnly) => Some(Vec::new()),
                Some(types::ProjectionType::Include) => Some(
                    projection
                        .and_then(|projection| projection.non_key_attributes.as_deref())
                        .unwrap_or_default()
                        .iter()
                        .map(String::as_str)
                        .collect(),
                ),
                _ => None,
            };
        match retained {
            Some(retained) => item
                .iter()
                .filter(|(name, _)| {
                    let name = name.as_str();
                    self.key_names().any(|key| key == name)
                        || index
                            .key_schema()
                            .iter()
                            .any(|element| element.attribute_name() == name)
                        || retained.contains(&name)
                })
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            None => item.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    provision_requests: usize,
    tables: collections::HashMap<String, MemoryTable>,
}

/// In-memory [`Storage`] emulating the DynamoDB semantics the key-value client
/// relies on.
///
/// Items are kept in insertion order, index queries honor the index projection,
/// and key conditions are limited to `AND`-joined equalities. Clones share the
/// same tables.
///
/// ```rust
/// use dynamodb_kvs::{KvsClient, Schema, storage::memory::MemoryStorage};
///
/// # async fn example() -> dynamodb_kvs::Result<()> {
/// let client = KvsClient::new(MemoryStorage::new(), "t1", Schema::SingleKey).unwrap();
/// client.bootstrap().await?;
/// client.put(42, &serde_json::json!({"a": 1})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    activation_polls: u32,
    inner: sync::Arc<sync::Mutex<Inner>>,
}

impl MemoryStorage {
    /// Create an empty storage whose tables are active as soon as they are created.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report newly created tables as `CREATING` for the first `polls` descriptions.
    pub fn with_activation_polls(mut self, polls: u32) -> Self {
        self.activation_polls = polls;
        self
    }

    /// The create-table request a table was created with.
    pub fn table_definition(&self, table_name: &str) -> Option<CreateTableInput> {
        self.lock()
            .tables
            .get(table_name)
            .map(|table| table.definition.clone())
    }

    /// Number of create-table requests received, including rejected ones.
    pub fn provision_requests(&self) -> usize {
        self.lock().provision_requests
    }

    /// Every item stored in a table, in insertion order.
    pub fn items(&self, table_name: &str) -> Vec<common::AttributeMap> {
        self.lock()
            .tables
            .get(table_name)
            .map(|table| table.items.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(sync::PoisonError::into_inner)
    }
}

fn missing_table(table_name: &str) -> Error {
    Error::Storage(format!("requested resource not found: table {table_name}").into())
}

fn key_conditions(input: &QueryInput) -> Result<Vec<(String, types::AttributeValue)>> {
    input
        .key_condition_expression
        .split(" AND ")
        .map(|clause| -> Result<(String, types::AttributeValue)> {
            let (name, value) = clause.split_once(" = ").ok_or_else(|| {
                Error::Storage(format!("unsupported key condition `{clause}`").into())
            })?;
            let name = name.trim();
            let name = input
                .expression_attribute_names
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string());
            let value = input
                .expression_attribute_values
                .get(value.trim())
                .cloned()
                .ok_or_else(|| {
                    Error::Storage(format!("unbound value placeholder in `{clause}`").into())
                })?;
            Ok((name, value))
        })
        .collect()
}

impl Storage for MemoryStorage {
    async fn provision_table(&self, input: CreateTableInput) -> Result<()> {
        let mut inner = self.lock();
        inner.provision_requests += 1;
        if inner.tables.contains_key(&input.table_name) {
            return Err(Error::TableAlreadyExists {
                table_name: input.table_name,
            });
        }
        let table = MemoryTable {
            definition: input.clone(),
            items: Vec::new(),
            pending_polls: self.activation_polls,
        };
        inner.tables.insert(input.table_name, table);
        Ok(())
    }

    async fn table_state(&self, table_name: &str) -> Result<TableState> {
        let mut inner = self.lock();
        let table = inner
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound {
                table_name: table_name.to_string(),
            })?;
        let (status, index_status) = if table.pending_polls > 0 {
            table.pending_polls -= 1;
            (types::TableStatus::Creating, types::IndexStatus::Creating)
        } else {
            (types::TableStatus::Active, types::IndexStatus::Active)
        };
        let index_count = table
            .definition
            .global_secondary_indexes
            .as_ref()
            .map_or(0, Vec::len);
        let state = TableState {
            index_statuses: vec![index_status; index_count],
            status: Some(status),
        };
        Ok(state)
    }

    async fn fetch_item(&self, input: GetItemInput) -> Result<Option<common::AttributeMap>> {
        let inner = self.lock();
        let table = inner
            .tables
            .get(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        table.validate_key(&input.key, true)?;
        let item = table
            .items
            .iter()
            .find(|item| table.has_key(item, &input.key))
            .cloned();
        Ok(item)
    }

    async fn store_item(&self, input: PutItemInput) -> Result<()> {
        let mut inner = self.lock();
        let table = inner
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        table.validate_key(&input.item, false)?;
        match table
            .items
            .iter()
            .position(|item| table.has_key(item, &input.item))
        {
            Some(position) => table.items[position] = input.item,
            None => table.items.push(input.item),
        }
        Ok(())
    }

    async fn query_items(&self, input: QueryInput) -> Result<Vec<common::AttributeMap>> {
        let conditions = key_conditions(&input)?;
        let inner = self.lock();
        let table = inner
            .tables
            .get(&input.table_name)
            .ok_or_else(|| missing_table(&input.table_name))?;
        let index = match &input.index_name {
            Some(index_name) => Some(
                table
                    .definition
                    .global_secondary_indexes
                    .iter()
                    .flatten()
                    .find(|index| index.index_name() == index_name)
                    .ok_or_else(|| {
                        Error::Storage(format!("the table does not have index {index_name}").into())
                    })?,
            ),
            None => None,
        };
        let items = table
            .items
            .iter()
            .filter(|item| {
                conditions
                    .iter()
                    .all(|(name, value)| item.get(name) == Some(value))
            })
            .map(|item| match index {
                Some(index) => table.projected(index, item),
                None => item.clone(),
            })
            .collect();
        Ok(items)
    }
}
