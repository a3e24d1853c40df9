use crate::{Error, Result, common, schema};

use aws_sdk_dynamodb::{primitives, types};
use serde::Serialize;

/// Key attributes of a stored record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RecordKey {
    /// The primary key.
    pub primary_key: i64,
    /// The secondary key, only set on secondary-index tables.
    pub secondary_key: Option<i64>,
}

impl RecordKey {
    /// Build the attribute map addressing this record.
    pub fn into_attribute_map(self) -> Result<common::AttributeMap> {
        common::key::Keys::record(self.primary_key, self.secondary_key).try_into()
    }
}

fn decode_key(item: &common::AttributeMap, name: &'static str) -> Result<Option<i64>> {
    match item.get(name) {
        None => Ok(None),
        Some(types::AttributeValue::S(encoded)) => common::key::decode(encoded).map(Some),
        Some(_) => Err(Error::MalformedItem(name)),
    }
}

impl TryFrom<&common::AttributeMap> for RecordKey {
    type Error = Error;

    fn try_from(item: &common::AttributeMap) -> Result<Self> {
        let primary_key = decode_key(item, schema::PRIMARY_KEY)?
            .ok_or(Error::MalformedItem(schema::PRIMARY_KEY))?;
        let secondary_key = decode_key(item, schema::SECONDARY_KEY)?;
        Ok(Self {
            primary_key,
            secondary_key,
        })
    }
}

/// A record as persisted in the table: the keys plus the JSON-encoded value.
///
/// ```rust
/// use dynamodb_kvs::common::item;
/// use serde_json::json;
///
/// let record = item::ItemRecord::new(42, None, &json!({"a": 1})).unwrap();
/// assert_eq!(record.value, br#"{"a":1}"#);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemRecord {
    /// The record keys.
    pub key: RecordKey,
    /// The serialized value, opaque to the store.
    pub value: Vec<u8>,
}

impl ItemRecord {
    /// Serialize `value` into a record stored under the given keys.
    pub fn new<V: Serialize + ?Sized>(
        primary_key: i64,
        secondary_key: Option<i64>,
        value: &V,
    ) -> Result<Self> {
        let record = Self {
            key: RecordKey {
                primary_key,
                secondary_key,
            },
            value: serde_json::to_vec(value)?,
        };
        Ok(record)
    }
}

impl From<ItemRecord> for common::AttributeMap {
    fn from(record: ItemRecord) -> Self {
        let mut item = Self::from([
            (
                schema::PRIMARY_KEY.to_string(),
                types::AttributeValue::S(common::key::encode(record.key.primary_key)),
            ),
            (
                schema::VALUE.to_string(),
                types::AttributeValue::B(primitives::Blob::new(record.value)),
            ),
        ]);
        if let Some(secondary_key) = record.key.secondary_key {
            item.insert(
                schema::SECONDARY_KEY.to_string(),
                types::AttributeValue::S(common::key::encode(secondary_key)),
            );
        }
        item
    }
}

/// Remove and return the `value` attribute of `item`, if present.
pub(crate) fn take_value(item: &mut common::AttributeMap) -> Result<Option<Vec<u8>>> {
    match item.remove(schema::VALUE) {
        None => Ok(None),
        Some(types::AttributeValue::B(blob)) => Ok(Some(blob.into_inner())),
        Some(_) => Err(Error::MalformedItem(schema::VALUE)),
    }
}

impl TryFrom<common::AttributeMap> for ItemRecord {
    type Error = Error;

    fn try_from(mut item: common::AttributeMap) -> Result<Self> {
        let value = take_value(&mut item)?.ok_or(Error::MalformedItem(schema::VALUE))?;
        let key = RecordKey::try_from(&item)?;
        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::primary_only(
        ItemRecord {
            key: RecordKey {
                primary_key: 42,
                secondary_key: None,
            },
            value: b"{\"a\":1}".to_vec(),
        },
        common::AttributeMap::from(
            [
                (
                    "primary_key".to_string(),
                    types::AttributeValue::S(
                        "42".to_string()
                    )
                ),
                (
                    "value".to_string(),
                    types::AttributeValue::B(
                        primitives::Blob::new(b"{\"a\":1}".to_vec())
                    )
                ),
            ]
        )
    )]
    #[case::primary_and_secondary(
        ItemRecord {
            key: RecordKey {
                primary_key: i64::MIN,
                secondary_key: Some(i64::MAX),
            },
            value: b"true".to_vec(),
        },
        common::AttributeMap::from(
            [
                (
                    "primary_key".to_string(),
                    types::AttributeValue::S(
                        "-9223372036854775808".to_string()
                    )
                ),
                (
                    "secondary_key".to_string(),
                    types::AttributeValue::S(
                        "9223372036854775807".to_string()
                    )
                ),
                (
                    "value".to_string(),
                    types::AttributeValue::B(
                        primitives::Blob::new(b"true".to_vec())
                    )
                ),
            ]
        )
    )]
    fn test_record_to_attribute_map(
        #[case] record: ItemRecord,
        #[case] expected: common::AttributeMap,
    ) {
        let actual: common::AttributeMap = record.clone().into();
        assert_eq!(actual, expected);
        let decoded = ItemRecord::try_from(actual).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_new_serializes_json() {
        let record = ItemRecord::new(7, Some(9), &json!({"x": true})).unwrap();
        assert_eq!(record.value, b"{\"x\":true}");
        assert_eq!(
            record.key,
            RecordKey {
                primary_key: 7,
                secondary_key: Some(9),
            }
        );
    }

    #[rstest]
    #[case::missing_primary_key(
        common::AttributeMap::from(
            [(
                "value".to_string(),
                types::AttributeValue::B(primitives::Blob::new(b"1".to_vec())),
            )]
        ),
        "primary_key"
    )]
    #[case::missing_value(
        common::AttributeMap::from(
            [(
                "primary_key".to_string(),
                types::AttributeValue::S("1".to_string()),
            )]
        ),
        "value"
    )]
    #[case::numeric_primary_key(
        common::AttributeMap::from(
            [
                ("primary_key".to_string(), types::AttributeValue::N("1".to_string())),
                ("value".to_string(), types::AttributeValue::B(primitives::Blob::new(b"1".to_vec()))),
            ]
        ),
        "primary_key"
    )]
    #[case::string_value(
        common::AttributeMap::from(
            [
                ("primary_key".to_string(), types::AttributeValue::S("1".to_string())),
                ("value".to_string(), types::AttributeValue::S("1".to_string())),
            ]
        ),
        "value"
    )]
    fn test_malformed_record(#[case] item: common::AttributeMap, #[case] attribute: &str) {
        let actual = ItemRecord::try_from(item);
        assert!(matches!(actual, Err(Error::MalformedItem(name)) if name == attribute));
    }

    #[test]
    fn test_record_key_from_keys_only_item() {
        let item = common::AttributeMap::from([
            (
                "primary_key".to_string(),
                types::AttributeValue::S("2".to_string()),
            ),
            (
                "secondary_key".to_string(),
                types::AttributeValue::S("100".to_string()),
            ),
        ]);
        let actual = RecordKey::try_from(&item).unwrap();
        assert_eq!(
            actual,
            RecordKey {
                primary_key: 2,
                secondary_key: Some(100),
            }
        );
    }
}
