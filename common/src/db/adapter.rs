//! Generic table operations over the shared connection handle.

use std::sync::Arc;

use super::backend::TableRequest;
use super::provider::{ConnectionProvider, Handle};
use super::query::{Predicate, QuerySpec};
use super::{Filters, Record};
use crate::errors::AppResult;

/// Column every single-row operation targets.
pub const ID_COLUMN: &str = "id";

/// Supabase data access adapter.
///
/// Stateless apart from the provider it shares with every clone. Errors from
/// the service are returned unchanged; nothing is retried.
#[derive(Clone)]
pub struct SupabaseDb {
    provider: Arc<ConnectionProvider>,
}

impl SupabaseDb {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Returns the connection handle, creating it on first use.
    pub async fn get_handle(&self) -> AppResult<Handle> {
        self.provider.get_handle().await
    }

    async fn execute(&self, request: TableRequest) -> AppResult<Vec<Record>> {
        let handle = self.get_handle().await?;
        let table = request.table().to_string();
        let operation = request.operation();
        let rows = handle.execute(request).await?;
        tracing::debug!(table = %table, operation, rows = rows.len(), "Supabase call completed");
        Ok(rows)
    }

    /// Inserts one record, returning the stored row if the service reports one.
    pub async fn insert(&self, table: &str, record: Record) -> AppResult<Option<Record>> {
        let rows = self
            .execute(TableRequest::Insert {
                table: table.to_string(),
                rows: vec![record],
            })
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Inserts a batch, returning the stored rows in the service's order.
    pub async fn insert_many(&self, table: &str, records: Vec<Record>) -> AppResult<Vec<Record>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.execute(TableRequest::Insert {
            table: table.to_string(),
            rows: records,
        })
        .await
    }

    /// Selects `columns` from `table`, one equality predicate per filter entry.
    pub async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Record>> {
        let mut query = QuerySpec::new().select(columns);
        if let Some(filters) = filters {
            query = query.filters(filters);
        }
        self.query(table, query).await
    }

    /// Selects the row whose `id` equals `id`.
    pub async fn select_one(&self, table: &str, id: &str, columns: &str) -> AppResult<Option<Record>> {
        let query = QuerySpec::new().select(columns).eq(ID_COLUMN, id);
        let rows = self.query(table, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Applies `record` to the row whose `id` equals `id`.
    pub async fn update(&self, table: &str, id: &str, record: Record) -> AppResult<Option<Record>> {
        let rows = self
            .execute(TableRequest::Update {
                table: table.to_string(),
                predicates: vec![Predicate::eq(ID_COLUMN, id)],
                values: record,
            })
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Deletes the row whose `id` equals `id`; `false` if nothing matched.
    pub async fn delete(&self, table: &str, id: &str) -> AppResult<bool> {
        let rows = self
            .execute(TableRequest::Delete {
                table: table.to_string(),
                predicates: vec![Predicate::eq(ID_COLUMN, id)],
            })
            .await?;
        Ok(!rows.is_empty())
    }

    /// Runs an arbitrary read described by `query`.
    pub async fn query(&self, table: &str, query: QuerySpec) -> AppResult<Vec<Record>> {
        self.execute(TableRequest::Select {
            table: table.to_string(),
            query,
        })
        .await
    }
}
