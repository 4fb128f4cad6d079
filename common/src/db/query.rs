//! Query specifications.
//!
//! A [`QuerySpec`] describes a read against one table: projection, predicates,
//! ordering and limit. The vendor client translates it into PostgREST query
//! parameters with [`QuerySpec::to_query_pairs`].

use serde_json::Value;

use super::Filters;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
}

impl Operator {
    /// PostgREST operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
        }
    }
}

/// A single `column <op> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    /// Renders the predicate as a PostgREST `(column, "op.value")` pair.
    pub fn to_query_pair(&self) -> (String, String) {
        let rendered = match (&self.op, &self.value) {
            (Operator::Eq, Value::Null) => "is.null".to_string(),
            (op, value) => format!("{}.{}", op.as_str(), render_value(value)),
        };
        (self.column.clone(), rendered)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Read query against a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub columns: String,
    pub predicates: Vec<Predicate>,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            columns: "*".to_string(),
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the projection: a comma-separated column list or `*`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::new(column, Operator::Eq, value))
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::new(column, Operator::Gt, value))
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::new(column, Operator::Lt, value))
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds one equality predicate per filter entry.
    pub fn filters(mut self, filters: &Filters) -> Self {
        self.predicates.extend(
            filters
                .iter()
                .map(|(column, value)| Predicate::eq(column.clone(), value.clone())),
        );
        self
    }

    /// Appends a sort key; keys apply in the order they were added.
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Translates the query into PostgREST URL parameters.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.predicates.iter().map(Predicate::to_query_pair));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, dir)| format!("{}.{}", column, dir.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

/// Renders a filter value the way PostgREST expects it in a URL.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
