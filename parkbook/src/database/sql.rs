//! Translation of typed queries into parameterized SQL.
//!
//! Every value is bound as a parameter; only column names chosen from a
//! fixed table reach the SQL text.

use rusqlite::types::Value as SqlValue;

use crate::store::{Field, Filter, OrderBy, Query, Value};

/// Maps query fields to the columns of one table.
pub(super) type ColumnMap = fn(Field) -> Option<&'static str>;

/// Rendered `WHERE`/`ORDER BY`/`LIMIT` tail plus its parameters.
#[derive(Debug, Default)]
pub(super) struct SqlTail {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

pub(super) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Date(v) => SqlValue::Text(v.format("%Y-%m-%d").to_string()),
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn render_filter(filter: &Filter, columns: ColumnMap, out: &mut SqlTail) {
    let comparison = |field: Field, op: &str, value: &Value, out: &mut SqlTail| {
        match columns(field) {
            Some(column) => {
                // E-mails compare case-insensitively
                let collate = if field == Field::RequesterEmail {
                    " COLLATE NOCASE"
                } else {
                    ""
                };
                out.sql.push_str(&format!("{column} {op} ?{collate}"));
                out.params.push(to_sql_value(value));
            }
            // Filters on fields the table lacks never match
            None => out.sql.push('0'),
        }
    };

    match filter {
        Filter::Eq(field, value) => comparison(*field, "=", value, out),
        Filter::Ne(field, value) => comparison(*field, "<>", value, out),
        Filter::Gte(field, value) => comparison(*field, ">=", value, out),
        Filter::Lte(field, value) => comparison(*field, "<=", value, out),
        Filter::Contains(field, needle) => match columns(*field) {
            Some(column) => {
                out.sql
                    .push_str(&format!("lower({column}) LIKE ? ESCAPE '\\'"));
                out.params.push(SqlValue::Text(escape_like(needle)));
            }
            None => out.sql.push('0'),
        },
        Filter::And(filters) | Filter::Or(filters) => {
            if filters.is_empty() {
                out.sql
                    .push(if matches!(filter, Filter::And(_)) { '1' } else { '0' });
                return;
            }
            let joiner = if matches!(filter, Filter::And(_)) {
                " AND "
            } else {
                " OR "
            };
            out.sql.push('(');
            for (i, part) in filters.iter().enumerate() {
                if i > 0 {
                    out.sql.push_str(joiner);
                }
                render_filter(part, columns, out);
            }
            out.sql.push(')');
        }
        Filter::Not(inner) => {
            out.sql.push_str("NOT (");
            render_filter(inner, columns, out);
            out.sql.push(')');
        }
    }
}

fn render_order(order_by: &[OrderBy], columns: ColumnMap, out: &mut SqlTail) {
    let keys: Vec<String> = order_by
        .iter()
        .filter_map(|key| {
            columns(key.field).map(|column| {
                if key.descending {
                    format!("{column} DESC")
                } else {
                    column.to_string()
                }
            })
        })
        .collect();
    out.sql.push_str(" ORDER BY ");
    if keys.is_empty() {
        out.sql.push_str("id");
    } else {
        out.sql.push_str(&keys.join(", "));
    }
}

/// Renders the clauses that follow `SELECT ... FROM table`.
pub(super) fn render_query(query: &Query, columns: ColumnMap) -> SqlTail {
    let mut out = SqlTail::default();
    if let Some(filter) = &query.filter {
        out.sql.push_str(" WHERE ");
        render_filter(filter, columns, &mut out);
    }
    render_order(&query.order_by, columns, &mut out);
    if let Some(top) = query.top {
        out.sql.push_str(&format!(" LIMIT {top}"));
    }
    out
}
