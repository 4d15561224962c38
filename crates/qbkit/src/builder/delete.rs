use super::commands::{Commands, RenderCache};
use super::param::ParamList;
use super::table::{JoinList, TableRef};
use super::traits::{MutationBuilder, SqlBuilder, log_rendered};
use super::where_builder::WhereBuilder;
use crate::config::{BuilderConfig, DEFAULT_IN_LIST_LIMIT};
use crate::error::{QbError, QbResult};

/// DELETE builder.
///
/// Renders `DELETE table [alias] [joins] [WHERE ...] [ORDER BY] [LIMIT]`.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: TableRef,
    table_alias: Option<String>,
    joins: JoinList,
    conditions: WhereBuilder,
    order_by: Vec<String>,
    limit: Option<u64>,
    in_list_limit: usize,
    params: ParamList,
    cache: RenderCache,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            table_alias: None,
            joins: JoinList::default(),
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

    pub fn to_sql(&self) -> QbResult<String> {
        if self.table.is_empty() {
            return Err(QbError::MissingTable("DELETE"));
        }

        let mut commands = Commands::new();
        commands.push("DELETE");
        self.push_head(&mut commands)?;
        self.push_where(&mut commands);
        self.push_order_limit(&mut commands);

        Ok(commands.finish())
    }
}

impl Default for DeleteBuilder {
    fn default() -> Self {
        Self::new(TableRef::default())
    }
}

impl SqlBuilder for DeleteBuilder {
    fn kind(&self) -> &'static str {
        "DELETE"
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

impl MutationBuilder for DeleteBuilder {}

/// Shortcut for [`DeleteBuilder::new`].
pub fn delete(table: impl Into<TableRef>) -> DeleteBuilder {
    DeleteBuilder::new(table)
}
