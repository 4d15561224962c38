use super::commands::{Commands, RenderCache};
use super::param::ParamList;
use super::table::{JoinList, TableRef};
use super::traits::{SqlBuilder, log_rendered};
use super::where_builder::WhereBuilder;
use crate::condition::{ConditionChain, Connector};
use crate::config::{BuilderConfig, DEFAULT_IN_LIST_LIMIT};
use crate::error::{QbError, QbResult};

/// One explicit SELECT column.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectColumn {
    expr: String,
    alias: Option<String>,
}

impl SelectColumn {
    fn render(&self) -> String {
        match &self.alias {
            Some(alias) if alias != &self.expr => format!("{} AS {}", self.expr, alias),
            _ => self.expr.clone(),
        }
    }
}

/// `FUNC(expr) [AS alias]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Aggregate {
    func: String,
    expr: String,
    alias: Option<String>,
}

impl Aggregate {
    fn render(&self) -> String {
        let call = format!("{}({})", self.func, self.expr);
        match &self.alias {
            Some(alias) => format!("{} AS {}", call, alias),
            None => call,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// SELECT builder.
///
/// Clause order: `WITH`, `SELECT [hint] [DISTINCT] columns`, `FROM table
/// [alias]`, joins, `WHERE`, `GROUP BY`, `HAVING`, `ORDER BY`, `LIMIT`,
/// `OFFSET`.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    ctes: Vec<(String, TableRef)>,
    max_execution_time: Option<u64>,
    distinct: bool,
    table: TableRef,
    table_alias: Option<String>,
    columns: Vec<SelectColumn>,
    aggregates: Vec<Aggregate>,
    group_by: bool,
    joins: JoinList,
    conditions: WhereBuilder,
    having: WhereBuilder,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    in_list_limit: usize,
    params: ParamList,
    cache: RenderCache,
}

impl SelectBuilder {
    /// Create a SELECT on `table`.
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ctes: Vec::new(),
            max_execution_time: None,
            distinct: false,
            table: table.into(),
            table_alias: None,
            columns: Vec::new(),
            aggregates: Vec::new(),
            group_by: false,
            joins: JoinList::default(),
            conditions: WhereBuilder::new(),
            having: WhereBuilder::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            in_list_limit: DEFAULT_IN_LIST_LIMIT,
            params: ParamList::new(),
            cache: RenderCache::default(),
        }
    }

    /// Create a SELECT on `table AS alias`.
    pub fn aliased(table: impl Into<TableRef>, alias: &str) -> Self {
        let mut builder = Self::new(table);
        builder.alias(alias);
        builder
    }

    /// Create a SELECT using the in-list limit and execution time hint from `config`.
    pub fn with_config(table: impl Into<TableRef>, config: &BuilderConfig) -> Self {
        let mut builder = Self::new(table);
        builder.in_list_limit = config.in_list_limit.max(1);
        builder.max_execution_time = config.max_execution_time_ms;
        builder
    }

    impl_table_methods!();
    impl_filter_methods!();

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self.cache.invalidate();
        self
    }

    /// Replace the explicit column list.
    pub fn columns<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns.clear();
        for column in columns {
            let column: String = column.into();
            if let Some(expr) = non_empty(&column) {
                self.columns.push(SelectColumn { expr, alias: None });
            }
        }
        self.cache.invalidate();
        self
    }

    /// Append one column.
    pub fn column(&mut self, expr: &str) -> &mut Self {
        if let Some(expr) = non_empty(expr) {
            self.columns.push(SelectColumn { expr, alias: None });
            self.cache.invalidate();
        }
        self
    }

    /// Append `expr AS alias`. The alias is dropped when it equals `expr`.
    pub fn column_as(&mut self, expr: &str, alias: &str) -> &mut Self {
        if let Some(expr) = non_empty(expr) {
            self.columns.push(SelectColumn {
                expr,
                alias: non_empty(alias),
            });
            self.cache.invalidate();
        }
        self
    }

    /// Append `FUNC(expr) [AS alias]`. Enables GROUP BY over the explicit
    /// columns.
    pub fn aggregate(&mut self, func: &str, expr: &str, alias: &str) -> &mut Self {
        if let Some(func) = non_empty(func) {
            self.aggregates.push(Aggregate {
                func: func.to_ascii_uppercase(),
                expr: expr.trim().to_string(),
                alias: non_empty(alias),
            });
            self.cache.invalidate();
        }
        self
    }

    /// Group by the explicit column list even without aggregates.
    pub fn group_by_columns(&mut self, enabled: bool) -> &mut Self {
        self.group_by = enabled;
        self.cache.invalidate();
        self
    }

    /// Add a `WITH name AS (body)` entry. The body is raw SQL or a nested
    /// SELECT; re-using a name replaces its body.
    pub fn with(&mut self, name: &str, body: impl Into<TableRef>) -> &mut Self {
        let Some(name) = non_empty(name) else {
            return self;
        };
        let body = body.into();
        match self.ctes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = body,
            None => self.ctes.push((name, body)),
        }
        self.cache.invalidate();
        self
    }

    /// Set the `MAX_EXECUTION_TIME` hint in milliseconds; `0` removes it.
    pub fn max_execution_time(&mut self, ms: i64) -> QbResult<&mut Self> {
        if ms < 0 {
            return Err(QbError::invalid_config(format!(
                "max execution time must be 0 or greater, got {}",
                ms
            )));
        }
        self.max_execution_time = (ms > 0).then_some(ms as u64);
        self.cache.invalidate();
        Ok(self)
    }

    /// Set OFFSET; `0` removes it.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = (offset > 0).then_some(offset);
        self.cache.invalidate();
        self
    }

    // ==================== HAVING ====================

    /// Replace all HAVING conditions; the given ones are joined with `AND`.
    pub fn having<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.having.clear();
        self.having.add_all(conditions, Connector::And);
        self.cache.invalidate();
        self
    }

    pub fn add_having(&mut self, condition: impl Into<String>, connector: Connector) -> &mut Self {
        if self.having.add(condition, connector) {
            self.cache.invalidate();
        }
        self
    }

    pub fn and_having<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.having.add_all(conditions, Connector::And) {
            self.cache.invalidate();
        }
        self
    }

    pub fn or_having<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if self.having.add_all(conditions, Connector::Or) {
            self.cache.invalidate();
        }
        self
    }

    pub fn having_chain(&mut self, chain: &ConditionChain) -> &mut Self {
        if self.having.add_chain(chain, Connector::And) {
            self.cache.invalidate();
        }
        self
    }

    pub fn clear_having(&mut self) -> &mut Self {
        self.having.clear();
        self.cache.invalidate();
        self
    }

    // ==================== Render ====================

    fn column_list(&self) -> String {
        let rendered: Vec<String> = self
            .columns
            .iter()
            .map(SelectColumn::render)
            .chain(self.aggregates.iter().map(Aggregate::render))
            .collect();

        if rendered.is_empty() {
            "*".to_string()
        } else {
            rendered.join(",")
        }
    }

    fn group_by_list(&self) -> Option<String> {
        if !self.group_by && self.aggregates.is_empty() {
            return None;
        }
        if self.columns.is_empty() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| c.expr.as_str())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    fn cte_list(&self) -> QbResult<Option<String>> {
        if self.ctes.is_empty() {
            return Ok(None);
        }
        let entries = self
            .ctes
            .iter()
            .map(|(name, body)| match body {
                TableRef::Name(sql) => Ok(format!("{} AS ({})", name, sql)),
                TableRef::SubQuery(_) => Ok(format!("{} AS {}", name, body.to_sql()?)),
            })
            .collect::<QbResult<Vec<_>>>()?;
        Ok(Some(entries.join(", ")))
    }

    /// Build the SQL without touching the render cache.
    pub fn to_sql(&self) -> QbResult<String> {
        if self.table.is_empty() {
            return Err(QbError::MissingTable("SELECT"));
        }

        let mut commands = Commands::new();

        if let Some(ctes) = self.cte_list()? {
            commands.push("WITH").push(ctes);
        }

        commands.push("SELECT");
        if let Some(ms) = self.max_execution_time {
            commands.push(format!("/*+ MAX_EXECUTION_TIME({}) */", ms));
        }
        if self.distinct {
            commands.push("DISTINCT");
        }
        commands.push(self.column_list()).push("FROM");
        self.push_head(&mut commands)?;
        self.push_where(&mut commands);

        if let Some(group_by) = self.group_by_list() {
            commands.push("GROUP BY").push(group_by);
        }
        if !self.having.is_empty() {
            commands.push("HAVING").push(self.having.build_clause());
        }

        self.push_order_limit(&mut commands);
        if let Some(offset) = self.offset {
            commands.push("OFFSET").push(offset.to_string());
        }

        Ok(commands.finish())
    }
}

impl SqlBuilder for SelectBuilder {
    fn kind(&self) -> &'static str {
        "SELECT"
    }

    fn render(&mut self) -> QbResult<&str> {
        let sql = self.to_sql()?;
        log_rendered(self.kind(), &sql);
        Ok(self.cache.store(sql))
    }

    fn cache(&self) -> &RenderCache {
        &self.cache
    }

    fn params(&self) -> &ParamList {
        &self.params
    }
}

/// Shortcut for [`SelectBuilder::new`].
pub fn select(table: impl Into<TableRef>) -> SelectBuilder {
    SelectBuilder::new(table)
}
