use super::commands::{Commands, RenderCache};
use super::param::ParamList;
use super::table::{JoinList, TableRef};
use super::traits::{MutationBuilder, SqlBuilder, log_rendered};
use super::where_builder::WhereBuilder;
use crate::config::{BuilderConfig, DEFAULT_IN_LIST_LIMIT};
use crate::error::{QbError, QbResult};

/// UPDATE builder.
///
/// Renders `UPDATE table [alias] [joins] SET col=val, ... WHERE ... [ORDER BY]
/// [LIMIT]`. Rendering without any condition fails, so a whole-table update
/// always has to be spelled out (`where_(["1=1"])`).
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: TableRef,
    table_alias: Option<String>,
    joins: JoinList,
    /// SET items in render order
    set_list: Vec<(String, String)>,
    conditions: WhereBuilder,
    order_by: Vec<String>,
    limit: Option<u64>,
    in_list_limit: usize,
    params: ParamList,
    cache: RenderCache,
}

impl UpdateBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            table_alias: None,
            joins: JoinList::default(),
            set_list: Vec::new(),
            conditions: WhereBuilder::new(),
            order_by: Vec::new(),
            limit: None,
            in_list_limit: DEFAULT_IN_LIST_LIMIT,
            params: ParamList::new(),
            cache: RenderCache::default(),
        }
    }

    pub fn aliased(table: impl Into<TableRef>, alias: &str) -> Self {
        let mut builder = Self::new(table);
        builder.alias(alias);
        builder
    }

    pub fn with_config(table: impl Into<TableRef>, config: &BuilderConfig) -> Self {
        let mut builder = Self::new(table);
        builder.in_list_limit = config.in_list_limit.max(1);
        builder
    }

    impl_table_methods!();
    impl_filter_methods!();

    /// Set `column=value`. Setting an existing column moves it to the end.
    /// An empty column name is ignored.
    pub fn set_column(&mut self, column: &str, value: impl Into<String>) -> &mut Self {
        let column = column.trim();
        if column.is_empty() {
            return self;
        }
        self.set_list.retain(|(c, _)| c != column);
        self.set_list.push((column.to_string(), value.into()));
        self.cache.invalidate();
        self
    }

    /// Same as [`set_column`](Self::set_column).
    pub fn add_set_item(&mut self, column: &str, value: impl Into<String>) -> &mut Self {
        self.set_column(column, value)
    }

    pub fn get_column(&self, column: &str) -> Option<&str> {
        self.set_list
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the whole SET list. An empty input leaves the list unchanged.
    pub fn set_list<I, K, V>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items: Vec<(String, String)> = items
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.trim().is_empty())
            .collect();
        if items.is_empty() {
            return self;
        }

        self.set_list.clear();
        for (column, value) in items {
            self.set_column(&column, value);
        }
        self
    }

    /// Remove a SET item. Returns the builder unchanged if absent.
    pub fn remove_column(&mut self, column: &str) -> &mut Self {
        let before = self.set_list.len();
        self.set_list.retain(|(c, _)| c != column);
        if self.set_list.len() != before {
            self.cache.invalidate();
        }
        self
    }

    /// SET items in render order.
    pub fn set_items(&self) -> &[(String, String)] {
        &self.set_list
    }

    /// Build the SQL without touching the render cache.
    pub fn to_sql(&self) -> QbResult<String> {
        if self.table.is_empty() {
            return Err(QbError::MissingTable("UPDATE"));
        }
        if self.conditions.is_empty() {
            return Err(QbError::MissingCondition);
        }
        if self.set_list.is_empty() {
            return Err(QbError::EmptySet);
        }

        let mut commands = Commands::new();
        commands.push("UPDATE");
        self.push_head(&mut commands)?;

        commands.push("SET");
        for (column, value) in &self.set_list {
            commands.push(format!("{}={},", column, value));
        }
        commands.strip_trailing_comma();

        self.push_where(&mut commands);
        self.push_order_limit(&mut commands);

        Ok(commands.finish())
    }
}

impl Default for UpdateBuilder {
    /// Builder with no table; set one with `set_table` before rendering.
    fn default() -> Self {
        Self::new(TableRef::default())
    }
}

impl SqlBuilder for UpdateBuilder {
    fn kind(&self) -> &'static str {
        "UPDATE"
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

impl MutationBuilder for UpdateBuilder {}

/// Shortcut for [`UpdateBuilder::new`].
pub fn update(table: impl Into<TableRef>) -> UpdateBuilder {
    UpdateBuilder::new(table)
}
