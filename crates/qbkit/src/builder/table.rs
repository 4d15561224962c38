//! Table references and JOIN composition.

use super::select::SelectBuilder;
use crate::condition::ConditionChain;
use crate::error::{QbError, QbResult};
use std::fmt;
use std::str::FromStr;

/// A `FROM` / `JOIN` target: either a plain name or a nested SELECT.
#[derive(Debug, Clone)]
pub enum TableRef {
    Name(String),
    SubQuery(Box<SelectBuilder>),
}

impl TableRef {
    /// `true` for an unset (empty) name.
    pub fn is_empty(&self) -> bool {
        matches!(self, TableRef::Name(name) if name.trim().is_empty())
    }

    /// The table name, if this is a non-empty name reference.
    pub fn name(&self) -> Option<&str> {
        match self {
            TableRef::Name(name) if !name.trim().is_empty() => Some(name),
            _ => None,
        }
    }

    /// Render the target: a name verbatim, a nested SELECT as `(sql)`.
    pub fn to_sql(&self) -> QbResult<String> {
        match self {
            TableRef::Name(name) => Ok(name.clone()),
            TableRef::SubQuery(select) => Ok(format!("({})", select.to_sql()?)),
        }
    }
}

impl Default for TableRef {
    fn default() -> Self {
        TableRef::Name(String::new())
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Name(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Name(name)
    }
}

impl From<SelectBuilder> for TableRef {
    fn from(select: SelectBuilder) -> Self {
        TableRef::SubQuery(Box::new(select))
    }
}

/// JOIN flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    /// `FULL OUTER JOIN`
    Outer,
    /// Rendered without an `ON` clause.
    Natural,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Outer => "FULL OUTER",
            JoinType::Natural => "NATURAL",
        }
    }
}

impl FromStr for JoinType {
    type Err = QbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "INNER" => Ok(JoinType::Inner),
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            "OUTER" | "OUTTER" | "FULL" | "FULL OUTER" => Ok(JoinType::Outer),
            "NATURAL" => Ok(JoinType::Natural),
            _ => Err(QbError::invalid_config(format!(
                "join type not recognized: {:?}",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One JOIN clause.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    kind: JoinType,
    target: TableRef,
    alias: Option<String>,
    predicate: Option<ConditionChain>,
}

impl JoinSpec {
    pub fn new(
        kind: JoinType,
        target: impl Into<TableRef>,
        alias: &str,
        predicate: Option<ConditionChain>,
    ) -> Self {
        let alias = alias.trim();
        Self {
            kind,
            target: target.into(),
            alias: (!alias.is_empty()).then(|| alias.to_string()),
            predicate,
        }
    }

    pub fn kind(&self) -> JoinType {
        self.kind
    }

    pub fn target(&self) -> &TableRef {
        &self.target
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn predicate(&self) -> Option<&ConditionChain> {
        self.predicate.as_ref()
    }

    /// Key used to detect a repeated join: the alias, else the table name.
    pub fn key(&self) -> &str {
        self.alias
            .as_deref()
            .or_else(|| self.target.name())
            .unwrap_or("")
    }

    /// `<TYPE> JOIN target [alias] [ON predicate]`
    pub fn to_sql(&self) -> QbResult<String> {
        let mut parts = vec![format!("{} JOIN", self.kind), self.target.to_sql()?];

        if let Some(alias) = &self.alias {
            parts.push(alias.clone());
        }

        if self.kind != JoinType::Natural {
            let predicate = self
                .predicate
                .as_ref()
                .map(ConditionChain::render)
                .unwrap_or_default();
            if !predicate.is_empty() {
                parts.push(format!("ON {}", predicate));
            }
        }

        Ok(parts.join(" "))
    }
}

/// Ordered JOIN clauses keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct JoinList {
    joins: Vec<JoinSpec>,
}

impl JoinList {
    /// Add a join. A join with the same key is replaced in place.
    pub fn insert(&mut self, join: JoinSpec) {
        match self.joins.iter_mut().find(|j| j.key() == join.key()) {
            Some(existing) => {
                tracing::warn!(
                    target: "qbkit.sql",
                    key = join.key(),
                    "join replaced an existing join with the same alias"
                );
                *existing = join;
            }
            None => self.joins.push(join),
        }
    }

    /// Remove the join keyed by `alias`. Returns `true` if one was removed.
    pub fn remove(&mut self, alias: &str) -> bool {
        let before = self.joins.len();
        self.joins.retain(|j| j.key() != alias);
        self.joins.len() != before
    }

    pub fn clear(&mut self) {
        self.joins.clear();
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JoinSpec> {
        self.joins.iter()
    }

    /// Rendered clauses in insertion order.
    pub fn to_sql(&self) -> QbResult<Vec<String>> {
        self.joins.iter().map(JoinSpec::to_sql).collect()
    }
}
