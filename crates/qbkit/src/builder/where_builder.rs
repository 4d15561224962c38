//! Shared WHERE/HAVING clause builder for SELECT, UPDATE, DELETE, plus the
//! `IN(...)` / `BETWEEN` string helpers.

use crate::condition::{ConditionChain, Connector};
use crate::config::DEFAULT_IN_LIST_LIMIT;
use std::fmt::Display;

/// Flat condition token list.
///
/// Conditions are stored as rendered text interleaved with connector
/// literals, e.g. `["a = 1", "AND", "b = 2"]`, and joined with spaces.
#[derive(Debug, Clone, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Raw token list.
    pub fn tokens(&self) -> &[String] {
        &self.conditions
    }

    /// Append one condition. A connector literal is inserted before it unless
    /// it is the first one; [`Connector::None`] is read as `AND`.
    ///
    /// Returns `false` when the condition is blank and nothing was added.
    pub fn add(&mut self, condition: impl Into<String>, connector: Connector) -> bool {
        let condition = condition.into();
        if condition.trim().is_empty() {
            return false;
        }

        if !self.conditions.is_empty() {
            self.conditions.push(connector.or_and().as_sql().to_string());
        }
        self.conditions.push(condition);
        true
    }

    /// Append several conditions with the same connector.
    ///
    /// Returns `true` if at least one condition was added.
    pub fn add_all<I>(&mut self, conditions: I, connector: Connector) -> bool
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut added = false;
        for condition in conditions {
            added |= self.add(condition, connector);
        }
        added
    }

    /// Append a rendered chain as one condition.
    pub fn add_chain(&mut self, chain: &ConditionChain, connector: Connector) -> bool {
        self.add(chain.render(), connector)
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    /// Build the clause body (without the `WHERE` keyword).
    pub fn build_clause(&self) -> String {
        self.conditions.join(" ")
    }
}

/// `column BETWEEN from AND to`, or `""` if any part is empty.
pub fn where_between(column: &str, from: &str, to: &str) -> String {
    if column.is_empty() || from.is_empty() || to.is_empty() {
        return String::new();
    }

    format!("{} BETWEEN {} AND {}", column, from, to)
}

/// `column IN(v1,v2,...)` split into groups of at most 1000 items.
///
/// See [`where_in_chunked`].
pub fn where_in<I>(column: &str, values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    where_in_chunked(column, values, DEFAULT_IN_LIST_LIMIT)
}

/// `column IN(v1,v2,...)` with at most `limit` items per list.
///
/// Longer lists become `(column IN(...) OR column IN(...) ...)`. Returns `""`
/// for an empty column name or an empty value set. A zero `limit` is read as 1.
pub fn where_in_chunked<I>(column: &str, values: I, limit: usize) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    if column.is_empty() || values.is_empty() {
        return String::new();
    }

    let limit = limit.max(1);
    if values.len() <= limit {
        return format!("{} IN({})", column, values.join(","));
    }

    let groups: Vec<String> = values
        .chunks(limit)
        .map(|chunk| format!("{} IN({})", column, chunk.join(",")))
        .collect();

    tracing::trace!(
        target: "qbkit.condition",
        column,
        values = values.len(),
        groups = groups.len(),
        "split IN list"
    );

    format!("({})", groups.join(" OR "))
}
