//! Multi-row INSERT with a bounded row buffer.
//!
//! Rows collect in a buffer; once it holds `row_limit` rows, the next
//! [`InsertBuilder::add_row`] calls [`InsertBuilder::flush`] first, which hands
//! the builder (and its rendered batch) to the `on_flush` callback and then
//! clears the buffer.
//!
//! ```
//! use qbkit::builder::{InsertBuilder, Row, SqlBuilder};
//!
//! let mut insert = InsertBuilder::new("users");
//! insert.set_columns(["id", "name"]);
//! insert.add_row(Row::from_values(["1", "'alice'"])).unwrap();
//! insert.add_row(Row::from_values(["2", ""])).unwrap();
//!
//! assert_eq!(
//!     insert.get_query().unwrap(),
//!     "INSERT INTO users (id,name) VALUES (1,'alice'), (2,NULL)"
//! );
//! ```

use super::commands::{Commands, RenderCache};
use super::param::ParamList;
use super::table::TableRef;
use super::traits::{MutationBuilder, SqlBuilder, log_rendered};
use crate::config::{BuilderConfig, DEFAULT_INSERT_ROW_LIMIT};
use crate::error::{QbError, QbResult};

/// Callback invoked with the builder when the row buffer is flushed.
pub type FlushCallback = Box<dyn FnMut(&mut InsertBuilder) -> QbResult<()> + Send>;

/// One row of values, optionally keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    entries: Vec<(Option<String>, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            entries: values.into_iter().map(|v| (None, v.into())).collect(),
        }
    }

    /// `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }

    /// Set a keyed value, replacing an earlier value for the same column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.as_deref() == Some(column.as_str()))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((Some(column), value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_deref() == Some(column))
            .map(|(_, value)| value.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    /// Column names of the keyed values.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(key, _)| key.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Empty, `null` and `NULL` become SQL `NULL`; anything else is verbatim.
fn sql_value(value: &str) -> &str {
    match value {
        "" | "null" | "NULL" => "NULL",
        other => other,
    }
}

/// INSERT builder with batch buffering.
pub struct InsertBuilder {
    table: TableRef,
    /// Declared column list, rendered as `(a,b,...)`
    columns: Vec<String>,
    /// Reorder keyed rows to `columns`
    track_columns: bool,
    pending_row: Row,
    pending_rows: Vec<Row>,
    row_limit: usize,
    total_flushed: usize,
    on_flush: Option<FlushCallback>,
    in_flush: bool,
    params: ParamList,
    cache: RenderCache,
    /// Build error (validated at render time)
    build_error: Option<String>,
}

impl std::fmt::Debug for InsertBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertBuilder")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("track_columns", &self.track_columns)
            .field("pending_row", &self.pending_row)
            .field("pending_rows", &self.pending_rows.len())
            .field("row_limit", &self.row_limit)
            .field("total_flushed", &self.total_flushed)
            .field("on_flush", &self.on_flush.is_some())
            .finish()
    }
}

impl Default for InsertBuilder {
    fn default() -> Self {
        Self::new(TableRef::default())
    }
}

impl InsertBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            track_columns: false,
            pending_row: Row::new(),
            pending_rows: Vec::new(),
            row_limit: DEFAULT_INSERT_ROW_LIMIT,
            total_flushed: 0,
            on_flush: None,
            in_flush: false,
            params: ParamList::new(),
            cache: RenderCache::default(),
            build_error: None,
        }
    }

    /// Create a builder using the row limit and column tracking from `config`.
    pub fn with_config(table: impl Into<TableRef>, config: &BuilderConfig) -> QbResult<Self> {
        config.validate()?;
        let mut builder = Self::new(table);
        builder.row_limit = config.insert_row_limit;
        builder.track_columns = config.track_columns;
        Ok(builder)
    }

    impl_table_methods!();

    // ==================== Columns ====================

    /// Replace the declared column list.
    pub fn set_columns<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.columns.clear();
        self.build_error = None;
        for column in columns {
            self.add_column(column);
        }
        self.cache.invalidate();
        self
    }

    /// Declare a column if not already present. An empty name is recorded as
    /// a build error.
    pub fn add_column(&mut self, column: impl Into<String>) -> &mut Self {
        let column: String = column.into();
        let column = column.trim();
        if column.is_empty() {
            self.build_error = Some("column name must not be empty".to_string());
            self.cache.invalidate();
            return self;
        }
        if !self.is_column_set(column) {
            self.columns.push(column.to_string());
            self.cache.invalidate();
        }
        self
    }

    pub fn is_column_set(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// With tracking on, keyed rows declare their columns and are rendered
    /// in declared column order (missing keys render `NULL`).
    pub fn track_columns(&mut self, track: bool) -> &mut Self {
        self.track_columns = track;
        self.cache.invalidate();
        self
    }

    pub fn is_tracking_columns(&self) -> bool {
        self.track_columns
    }

    // ==================== Rows ====================

    /// Set a value on the pending single row and declare its column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> &mut Self {
        let column = column.trim();
        self.add_column(column);
        if !column.is_empty() {
            self.pending_row.set(column, value);
            self.cache.invalidate();
        }
        self
    }

    pub fn pending_row(&self) -> &Row {
        &self.pending_row
    }

    /// Buffer a row, flushing first if the buffer is full.
    pub fn add_row(&mut self, row: Row) -> QbResult<&mut Self> {
        self.flush_if_full()?;
        self.push_row(row);
        Ok(self)
    }

    fn flush_if_full(&mut self) -> QbResult<()> {
        if !self.in_flush && self.pending_rows.len() >= self.row_limit {
            self.flush()?;
        }
        Ok(())
    }

    fn push_row(&mut self, row: Row) {
        if self.track_columns {
            let keys: Vec<String> = row.columns().map(str::to_string).collect();
            for key in keys {
                self.add_column(key);
            }
        }

        self.pending_rows.push(row);
        self.cache.invalidate();
    }

    pub fn add_rows<I>(&mut self, rows: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = Row>,
    {
        for row in rows {
            self.add_row(row)?;
        }
        Ok(self)
    }

    /// Move the pending single row into the buffer.
    ///
    /// If buffering triggers a flush and the callback fails, the row stays
    /// pending.
    pub fn prepare_row(&mut self) -> QbResult<&mut Self> {
        if self.pending_row.is_empty() {
            return Ok(self);
        }
        let row = std::mem::take(&mut self.pending_row);
        if let Err(err) = self.flush_if_full() {
            self.pending_row = row;
            return Err(err);
        }
        self.push_row(row);
        Ok(self)
    }

    pub fn clear_pending_row(&mut self) -> &mut Self {
        self.pending_row = Row::new();
        self.cache.invalidate();
        self
    }

    pub fn clear_pending_rows(&mut self) -> &mut Self {
        self.pending_rows.clear();
        self.cache.invalidate();
        self
    }

    /// Drop every buffered row, reset the flushed-row counter and forget a
    /// recorded column error.
    pub fn clear_rows(&mut self) -> &mut Self {
        self.clear_pending_row();
        self.clear_pending_rows();
        self.total_flushed = 0;
        self.build_error = None;
        self
    }

    /// Rows currently buffered.
    pub fn pending_rows(&self) -> &[Row] {
        &self.pending_rows
    }

    pub fn pending_row_count(&self) -> usize {
        self.pending_rows.len()
    }

    /// Rows handed to the flush callback so far.
    pub fn total_flushed(&self) -> usize {
        self.total_flushed
    }

    // ==================== Flush ====================

    /// Buffer size that triggers an automatic flush.
    pub fn set_row_limit(&mut self, limit: usize) -> QbResult<&mut Self> {
        if limit == 0 {
            return Err(QbError::invalid_config("row limit must be greater than 0"));
        }
        self.row_limit = limit;
        Ok(self)
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    /// Install the flush callback. It receives the builder with the batch
    /// still buffered, so it can call `get_query` and execute it.
    pub fn on_flush<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&mut InsertBuilder) -> QbResult<()> + Send + 'static,
    {
        self.on_flush = Some(Box::new(callback));
        self
    }

    /// Hand the buffered rows to the callback, then clear the buffer.
    ///
    /// A callback error is returned unchanged and the buffer is kept. The
    /// pending single row is not touched. Flushing an empty buffer is a no-op.
    pub fn flush(&mut self) -> QbResult<&mut Self> {
        if self.in_flush || self.pending_rows.is_empty() {
            return Ok(self);
        }

        if let Some(mut callback) = self.on_flush.take() {
            self.in_flush = true;
            let result = callback(self);
            self.in_flush = false;
            if self.on_flush.is_none() {
                self.on_flush = Some(callback);
            }
            result?;
        }

        let batch = self.pending_rows.len();
        self.total_flushed += batch;
        self.pending_rows.clear();
        self.cache.invalidate();

        tracing::debug!(
            target: "qbkit.insert",
            batch,
            total = self.total_flushed,
            "flushed insert batch"
        );

        Ok(self)
    }

    // ==================== Render ====================

    fn row_values(&self, row: &Row) -> String {
        let values: Vec<&str> = if self.track_columns {
            self.columns
                .iter()
                .map(|column| row.get(column).map(sql_value).unwrap_or("NULL"))
                .collect()
        } else {
            row.values().map(sql_value).collect()
        };
        format!("({}),", values.join(","))
    }

    fn build(&self) -> QbResult<String> {
        if let Some(err) = &self.build_error {
            return Err(QbError::validation(err.clone()));
        }
        if self.table.is_empty() {
            return Err(QbError::MissingTable("INSERT"));
        }
        if self.pending_rows.is_empty() {
            return Err(QbError::EmptyInsert);
        }

        let mut commands = Commands::new();
        commands.push("INSERT INTO").push(self.table.to_sql()?);
        if !self.columns.is_empty() {
            commands.push(format!("({})", self.columns.join(",")));
        }

        commands.push("VALUES");
        for row in &self.pending_rows {
            commands.push(self.row_values(row));
        }
        commands.strip_trailing_comma();

        Ok(commands.finish())
    }
}

impl SqlBuilder for InsertBuilder {
    fn kind(&self) -> &'static str {
        "INSERT"
    }

    /// Moves the pending single row into the buffer (which may trigger a
    /// flush), then renders every buffered row.
    fn render(&mut self) -> QbResult<&str> {
        self.prepare_row()?;
        let sql = self.build()?;
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

impl MutationBuilder for InsertBuilder {}

/// Shortcut for [`InsertBuilder::new`].
pub fn insert(table: impl Into<TableRef>) -> InsertBuilder {
    InsertBuilder::new(table)
}
