//! Supabase data access.
//!
//! [`SupabaseDb`] exposes generic record operations. It reaches the service
//! through a single handle owned by a [`ConnectionProvider`], which is created
//! lazily and shared by every caller. The handle is anything implementing
//! [`TableBackend`]; in production that is [`SupabaseClient`], which speaks
//! PostgREST over HTTP.

pub mod adapter;
pub mod backend;
pub mod provider;
pub mod query;
pub mod supabase;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{AppError, AppResult};

pub use adapter::{SupabaseDb, ID_COLUMN};
pub use backend::{TableBackend, TableRequest};
pub use provider::{BackendFactory, ConnectionProvider, Handle};
pub use query::{Direction, Operator, Predicate, QuerySpec};
pub use supabase::{ServiceCredentials, SupabaseClient};

/// One row: column name to value.
pub type Record = serde_json::Map<String, Value>;

/// Column name to required value; entries combine with AND.
pub type Filters = BTreeMap<String, Value>;

/// Converts a typed value into a record. The value must serialize to a JSON object.
pub fn to_record<T: Serialize>(value: &T) -> AppResult<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Internal(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(format!("failed to encode record: {}", e))),
    }
}

/// Decodes a record into a typed value.
pub fn from_record<T: DeserializeOwned>(record: Record) -> AppResult<T> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| AppError::Internal(format!("failed to decode record: {}", e)))
}

pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> AppResult<Vec<T>> {
    records.into_iter().map(from_record).collect()
}
