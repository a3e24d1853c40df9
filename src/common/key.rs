use crate::{Error, Result, common, schema};

use serde::Serialize;
use serde_dynamo::to_attribute_value;

/// Encode an integer key as its canonical decimal string.
///
/// ```rust
/// use dynamodb_kvs::common::key;
///
/// assert_eq!(key::encode(-42), "-42");
/// ```
pub fn encode(key: i64) -> String {
    key.to_string()
}

/// Decode a decimal string produced by [`encode`].
///
/// Only the canonical form is accepted, so that decoding stays the exact inverse
/// of encoding: `"+1"`, `"01"` or `"-0"` are rejected.
///
/// ```rust
/// use dynamodb_kvs::common::key;
///
/// assert_eq!(key::decode("-42").unwrap(), -42);
/// assert!(key::decode("042").is_err());
/// ```
pub fn decode(encoded: &str) -> Result<i64> {
    match encoded.parse::<i64>() {
        Ok(key) if encode(key) == encoded => Ok(key),
        _ => Err(Error::KeyEncoding(encoded.to_string())),
    }
}

/// Key component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

/// Primary key (partition key and optional sort key).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key.
    pub partition_key: Key<T>,
    /// The sort key, only for tables with composite primary keys.
    pub sort_key: Option<Key<T>>,
}

impl Keys<String> {
    /// Key of a record, addressed by its integer primary key and, on
    /// secondary-index tables, its integer secondary key.
    pub fn record(primary_key: i64, secondary_key: Option<i64>) -> Self {
        Self {
            partition_key: Key {
                name: schema::PRIMARY_KEY.to_string(),
                value: encode(primary_key),
            },
            sort_key: secondary_key.map(|secondary_key| Key {
                name: schema::SECONDARY_KEY.to_string(),
                value: encode(secondary_key),
            }),
        }
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for common::AttributeMap {
    type Error = Error;

    fn try_from(key: Keys<T>) -> Result<Self> {
        let partition_key_value = to_attribute_value(key.partition_key.value)?;
        let mut keys = Self::from([(key.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = key.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            keys.insert(sort_key.name, sort_key_value);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0, "0")]
    #[case::one(1, "1")]
    #[case::minus_one(-1, "-1")]
    #[case::min(i64::MIN, "-9223372036854775808")]
    #[case::max(i64::MAX, "9223372036854775807")]
    fn test_encode_decode(#[case] key: i64, #[case] encoded: &str) {
        assert_eq!(encode(key), encoded);
        assert_eq!(decode(encoded).unwrap(), key);
    }

    #[rstest]
    #[case::empty("")]
    #[case::plus_sign("+1")]
    #[case::leading_zero("01")]
    #[case::negative_zero("-0")]
    #[case::whitespace(" 1")]
    #[case::overflow("9223372036854775808")]
    #[case::underflow("-9223372036854775809")]
    #[case::not_a_number("abc")]
    fn test_decode_rejects(#[case] encoded: &str) {
        let actual = decode(encoded);
        assert!(matches!(actual, Err(Error::KeyEncoding(raw)) if raw == encoded));
    }

    #[rstest]
    #[case::primary_only(
        Keys::record(42, None),
        common::AttributeMap::from(
            [(
                "primary_key".to_string(),
                types::AttributeValue::S(
                    "42".to_string()
                ),
            )]
        )
    )]
    #[case::primary_and_secondary(
        Keys::record(-7, Some(9)),
        common::AttributeMap::from(
            [
                (
                    "primary_key".to_string(),
                    types::AttributeValue::S(
                        "-7".to_string()
                    )
                ),
                (
                    "secondary_key".to_string(),
                    types::AttributeValue::S(
                        "9".to_string()
                    )
                ),
            ]
        )
    )]
    fn test_keys_to_attribute_map(
        #[case] keys: Keys<String>,
        #[case] expected: common::AttributeMap,
    ) {
        let actual: common::AttributeMap = keys.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
