//! Select filters and ordering
//!
//! Rendered as REST query strings for the hosted backend and evaluated
//! directly by the in-memory gateway.

use std::cmp::Ordering;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::mapper::{parse_timestamp, WireRecord};

/// Characters escaped in filter values (everything but unreserved)
const VALUE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    IsNull(String),
    NotNull(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single row by id
    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::NotNull(column.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter part only, e.g. `id=eq.abc&deleted_at=is.null`
    pub fn filter_string(&self) -> String {
        self.filters
            .iter()
            .map(|filter| match filter {
                Filter::Eq(column, value) => {
                    format!("{}=eq.{}", column, utf8_percent_encode(value, VALUE_ESCAPE))
                }
                Filter::IsNull(column) => format!("{}=is.null", column),
                Filter::NotNull(column) => format!("{}=not.is.null", column),
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full select query string
    pub fn to_query_string(&self) -> String {
        let mut parts = vec!["select=*".to_string()];
        let filters = self.filter_string();
        if !filters.is_empty() {
            parts.push(filters);
        }
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            parts.push(format!("order={}.{}", order.column, dir));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        parts.join("&")
    }

    /// Whether a record passes every filter
    pub fn matches(&self, record: &WireRecord) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(column, value) => record.get(column).is_some_and(|v| value_text(v) == *value),
            Filter::IsNull(column) => record.get(column).map_or(true, Value::is_null),
            Filter::NotNull(column) => record.get(column).is_some_and(|v| !v.is_null()),
        })
    }

    /// Filter, sort and truncate records the way the backend would
    pub fn apply(&self, records: &[WireRecord]) -> Vec<WireRecord> {
        let mut rows: Vec<WireRecord> = records.iter().filter(|r| self.matches(r)).cloned().collect();
        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn looks_like_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 10 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
}

/// Nulls last ascending (first descending, as Postgres does); timestamps
/// compare as instants, numbers numerically
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) if looks_like_date(x) && looks_like_date(y) => {
            match (parse_timestamp(Some(x)), parse_timestamp(Some(y))) {
                (Some(tx), Some(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> WireRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_query_string() {
        let query = SelectQuery::new().is_null("deleted_at").order_by("created_at", false).limit(50);
        assert_eq!(query.to_query_string(), "select=*&deleted_at=is.null&order=created_at.desc&limit=50");
    }

    #[test]
    fn test_filter_values_are_escaped() {
        let query = SelectQuery::new().eq("title", "a&b c");
        assert_eq!(query.filter_string(), "title=eq.a%26b%20c");
        assert_eq!(SelectQuery::by_id("4f2c-9a").filter_string(), "id=eq.4f2c-9a");
    }

    #[test]
    fn test_matches() {
        let row = record(json!({ "id": "t1", "project_id": "p1", "deleted_at": null, "done": true }));
        assert!(SelectQuery::new().eq("project_id", "p1").is_null("deleted_at").matches(&row));
        assert!(SelectQuery::new().eq("done", "true").matches(&row));
        assert!(SelectQuery::new().is_null("missing").matches(&row));
        assert!(!SelectQuery::new().not_null("deleted_at").matches(&row));
        assert!(!SelectQuery::new().eq("project_id", "p2").matches(&row));
    }

    #[test]
    fn test_apply_orders_timestamps_as_instants() {
        let rows = vec![
            record(json!({ "id": "a", "created_at": "2024-01-01T00:00:00Z" })),
            record(json!({ "id": "b", "created_at": "2024-01-01T00:00:00.500Z" })),
            record(json!({ "id": "c", "created_at": null })),
        ];
        let ordered = SelectQuery::new().order_by("created_at", false).apply(&rows);
        let ids: Vec<_> = ordered.iter().map(|r| r["id"].as_str().unwrap()).collect();
        // Descending reverses everything, so the null row comes first
        assert_eq!(ids, vec!["c", "b", "a"]);

        let ordered = SelectQuery::new().order_by("created_at", true).apply(&rows);
        let ids: Vec<_> = ordered.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
