#![deny(missing_docs)]

//! # DynamoDB KVS
//!
//! A simple key-value store on top of Amazon DynamoDB tables.
//!
//! ## Overview
//!
//! Values are any `serde` serializable type, stored as JSON under a 64-bit
//! integer primary key. A table is bound to one of two schemas:
//! - [`Schema::SingleKey`]: values are read and written by primary key
//! - [`Schema::SecondaryIndex`]: values are also tagged with a secondary key,
//!   and every value sharing a secondary key can be queried through a global index
//!
//! The client provisions its table on first use and waits until it is active.
//!
//! ## Quick Example
//!
//! ```no_run
//! use dynamodb_kvs::{Connection, Schema};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = Connection::new("http://localhost:8000", "key", "secret", "us-east-1");
//! let client = connection.client("t2", Schema::SecondaryIndex).unwrap();
//! client.bootstrap().await?;
//! client.put_with_secondary(7, 9, &json!({"x": true})).await?;
//! let values = client.get_by_secondary(9).await?;
//! assert_eq!(values, vec![br#"{"x":true}"#.to_vec()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@connection`] - Connection parameters and client construction
//! - [`mod@lifecycle`] - Table creation and readiness wait
//! - [`mod@repository`] - Reads and writes by primary and secondary key
//! - [`mod@storage`] - The storage capability contract and its backends

/// The client handle.
pub mod client;

/// Common utilities for keys, key conditions, and item records.
pub mod common;

/// Connection parameters of the storage service.
pub mod connection;

/// Error types.
pub mod error;

pub mod lifecycle;

pub mod repository;

/// Table schemas and persisted attribute names.
pub mod schema;

pub mod storage;

pub use client::KvsClient;
pub use connection::Connection;
pub use error::{Error, Result};
pub use schema::Schema;
