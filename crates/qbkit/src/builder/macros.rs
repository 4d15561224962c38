//! Fluent methods shared by the statement builders.
//!
//! The builders keep their clause state in identically named fields, so these
//! macros expand the same accessors into each `impl` block:
//!
//! ```ignore
//! impl UpdateBuilder {
//!     impl_table_methods!();
//!     impl_filter_methods!();
//! }
//! ```
//!
//! `impl_table_methods!` expects `table: TableRef`, `params: ParamList` and
//! `cache: RenderCache`. `impl_filter_methods!` additionally expects
//! `table_alias: Option<String>`, `joins: JoinList`, `conditions: WhereBuilder`,
//! `order_by: Vec<String>`, `limit: Option<u64>` and `in_list_limit: usize`.

macro_rules! impl_table_methods {
    () => {
        /// Replace the target table (a name or a nested SELECT).
        pub fn set_table(&mut self, table: impl Into<$crate::builder::TableRef>) -> &mut Self {
            self.table = table.into();
            self.cache.invalidate();
            self
        }

        /// Target table reference.
        pub fn table(&self) -> &$crate::builder::TableRef {
            &self.table
        }

        /// Target table name, `None` when unset or a sub-query.
        pub fn table_name(&self) -> Option<&str> {
            self.table.name()
        }

        /// Append a positional parameter and return its 1-based index.
        pub fn bind<T>(&mut self, value: T) -> usize
        where
            T: tokio_postgres::types::ToSql + Send + Sync + 'static,
        {
            self.cache.invalidate();
            self.params.push(value)
        }

        /// Append a JSON parameter.
        pub fn bind_json<T: serde::Serialize>(&mut self, value: &T) -> serde_json::Result<usize> {
            let json = serde_json::to_value(value)?;
            Ok(self.bind(json))
        }

        /// Replace the parameter list.
        pub fn set_params(&mut self, params: $crate::builder::ParamList) -> &mut Self {
            self.params = params;
            self.cache.invalidate();
            self
        }

        pub fn clear_params(&mut self) -> &mut Self {
            self.params.clear();
            self.cache.invalidate();
            self
        }
    };
}

macro_rules! impl_filter_methods {
    () => {
        /// Set the table alias. An empty alias removes it.
        pub fn alias(&mut self, alias: &str) -> &mut Self {
            let alias = alias.trim();
            self.table_alias = (!alias.is_empty()).then(|| alias.to_string());
            self.cache.invalidate();
            self
        }

        /// Same as [`alias`](Self::alias).
        pub fn set_table_alias(&mut self, alias: &str) -> &mut Self {
            self.alias(alias)
        }

        pub fn table_alias(&self) -> Option<&str> {
            self.table_alias.as_deref()
        }

        // ==================== JOIN ====================

        /// Add a join whose type is given as text (`INNER`, `LEFT`, `RIGHT`,
        /// `OUTER`/`OUTTER`/`FULL`, `NATURAL`, case-insensitive).
        ///
        /// An empty predicate renders no `ON`. Re-using an alias replaces the
        /// earlier join.
        pub fn join(
            &mut self,
            kind: &str,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> $crate::error::QbResult<&mut Self> {
            let kind: $crate::builder::JoinType = kind.parse()?;
            Ok(self.add_join(kind, target, alias, on))
        }

        /// Add a join of a known type.
        pub fn add_join(
            &mut self,
            kind: $crate::builder::JoinType,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> &mut Self {
            let spec = $crate::builder::JoinSpec::new(kind, target, alias, Some(on.into()));
            self.joins.insert(spec);
            self.cache.invalidate();
            self
        }

        pub fn inner_join(
            &mut self,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> &mut Self {
            self.add_join($crate::builder::JoinType::Inner, target, alias, on)
        }

        pub fn left_join(
            &mut self,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> &mut Self {
            self.add_join($crate::builder::JoinType::Left, target, alias, on)
        }

        pub fn right_join(
            &mut self,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> &mut Self {
            self.add_join($crate::builder::JoinType::Right, target, alias, on)
        }

        /// `FULL OUTER JOIN`
        pub fn outer_join(
            &mut self,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
            on: impl Into<$crate::condition::ConditionChain>,
        ) -> &mut Self {
            self.add_join($crate::builder::JoinType::Outer, target, alias, on)
        }

        pub fn natural_join(
            &mut self,
            target: impl Into<$crate::builder::TableRef>,
            alias: &str,
        ) -> &mut Self {
            let spec = $crate::builder::JoinSpec::new(
                $crate::builder::JoinType::Natural,
                target,
                alias,
                None,
            );
            self.joins.insert(spec);
            self.cache.invalidate();
            self
        }

        /// Remove the join keyed by `alias` (no-op if absent).
        pub fn remove_join(&mut self, alias: &str) -> &mut Self {
            if self.joins.remove(alias) {
                self.cache.invalidate();
            }
            self
        }

        pub fn clear_joins(&mut self) -> &mut Self {
            self.joins.clear();
            self.cache.invalidate();
            self
        }

        pub fn joins(&self) -> &$crate::builder::JoinList {
            &self.joins
        }

        // ==================== WHERE ====================

        /// Replace all conditions; the given ones are joined with `AND`.
        pub fn where_<I>(&mut self, conditions: I) -> &mut Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            self.conditions.clear();
            self.conditions
                .add_all(conditions, $crate::condition::Connector::And);
            self.cache.invalidate();
            self
        }

        /// Append one condition with `connector` (ignored for the first one).
        pub fn add_condition(
            &mut self,
            condition: impl Into<String>,
            connector: $crate::condition::Connector,
        ) -> &mut Self {
            if self.conditions.add(condition, connector) {
                self.cache.invalidate();
            }
            self
        }

        pub fn add_conditions<I>(
            &mut self,
            conditions: I,
            connector: $crate::condition::Connector,
        ) -> &mut Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            if self.conditions.add_all(conditions, connector) {
                self.cache.invalidate();
            }
            self
        }

        /// Append conditions, each joined with `AND`.
        pub fn and_where<I>(&mut self, conditions: I) -> &mut Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            self.add_conditions(conditions, $crate::condition::Connector::And)
        }

        /// Append conditions, each joined with `OR`.
        pub fn or_where<I>(&mut self, conditions: I) -> &mut Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            self.add_conditions(conditions, $crate::condition::Connector::Or)
        }

        /// Append a rendered condition chain joined with `AND`.
        pub fn where_chain(&mut self, chain: &$crate::condition::ConditionChain) -> &mut Self {
            if self
                .conditions
                .add_chain(chain, $crate::condition::Connector::And)
            {
                self.cache.invalidate();
            }
            self
        }

        /// Append `column IN(...)` joined with `AND`, split by the configured
        /// in-list limit. Empty value sets add nothing.
        pub fn and_where_in<I>(&mut self, column: &str, values: I) -> &mut Self
        where
            I: IntoIterator,
            I::Item: std::fmt::Display,
        {
            let condition =
                $crate::builder::where_builder::where_in_chunked(column, values, self.in_list_limit);
            self.add_condition(condition, $crate::condition::Connector::And)
        }

        /// Append `column BETWEEN from AND to` joined with `AND`.
        pub fn and_where_between(&mut self, column: &str, from: &str, to: &str) -> &mut Self {
            let condition = $crate::builder::where_builder::where_between(column, from, to);
            self.add_condition(condition, $crate::condition::Connector::And)
        }

        pub fn clear_conditions(&mut self) -> &mut Self {
            self.conditions.clear();
            self.cache.invalidate();
            self
        }

        pub fn conditions(&self) -> &$crate::builder::WhereBuilder {
            &self.conditions
        }

        // ==================== ORDER / LIMIT ====================

        /// Append ORDER BY items (`"name"`, `"created_at DESC"`).
        pub fn order_by<I>(&mut self, items: I) -> &mut Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            for item in items {
                let item: String = item.into();
                if !item.trim().is_empty() {
                    self.order_by.push(format!("{},", item.trim()));
                }
            }
            self.cache.invalidate();
            self
        }

        pub fn clear_order_by(&mut self) -> &mut Self {
            self.order_by.clear();
            self.cache.invalidate();
            self
        }

        /// Set LIMIT; `0` removes it.
        pub fn limit(&mut self, limit: u64) -> &mut Self {
            self.limit = (limit > 0).then_some(limit);
            self.cache.invalidate();
            self
        }

        // Clause rendering shared by SELECT/UPDATE/DELETE.
        fn push_where(&self, commands: &mut $crate::builder::commands::Commands) {
            if !self.conditions.is_empty() {
                commands.push("WHERE").push(self.conditions.build_clause());
            }
        }

        fn push_order_limit(&self, commands: &mut $crate::builder::commands::Commands) {
            if !self.order_by.is_empty() {
                commands
                    .push("ORDER BY")
                    .push(self.order_by.join(" "))
                    .strip_trailing_comma();
            }
            if let Some(limit) = self.limit {
                commands.push("LIMIT").push(limit.to_string());
            }
        }

        fn push_head(
            &self,
            commands: &mut $crate::builder::commands::Commands,
        ) -> $crate::error::QbResult<()> {
            commands
                .push(self.table.to_sql()?)
                .push_opt(self.table_alias.as_deref());
            for join in self.joins.to_sql()? {
                commands.push(join);
            }
            Ok(())
        }
    };
}
