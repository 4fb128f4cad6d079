//! The capability a connection handle offers: executing table requests.

use async_trait::async_trait;

use super::query::{Predicate, QuerySpec};
use super::Record;
use crate::errors::AppResult;

/// One round trip against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRequest {
    Insert {
        table: String,
        rows: Vec<Record>,
    },
    Select {
        table: String,
        query: QuerySpec,
    },
    Update {
        table: String,
        predicates: Vec<Predicate>,
        values: Record,
    },
    Delete {
        table: String,
        predicates: Vec<Predicate>,
    },
}

impl TableRequest {
    pub fn table(&self) -> &str {
        match self {
            TableRequest::Insert { table, .. }
            | TableRequest::Select { table, .. }
            | TableRequest::Update { table, .. }
            | TableRequest::Delete { table, .. } => table,
        }
    }

    /// Short operation name used in logs.
    pub fn operation(&self) -> &'static str {
        match self {
            TableRequest::Insert { .. } => "insert",
            TableRequest::Select { .. } => "select",
            TableRequest::Update { .. } => "update",
            TableRequest::Delete { .. } => "delete",
        }
    }
}

/// An authenticated session with the external database service.
///
/// Implementations return the rows the service reports for the request
/// (inserted, matched, updated or deleted rows) and surface service failures
/// as [`AppError::ExternalService`](crate::errors::AppError::ExternalService).
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn execute(&self, request: TableRequest) -> AppResult<Vec<Record>>;
}
