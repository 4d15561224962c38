use super::commands::{RenderCache, truncate_for_log};
use super::param::ParamList;
use crate::client::GenericClient;
use crate::error::QbResult;
use tokio_postgres::Row;

const LOG_SQL_MAX: usize = 200;

pub(crate) fn log_rendered(kind: &'static str, sql: &str) {
    tracing::debug!(
        target: "qbkit.sql",
        kind,
        sql = truncate_for_log(sql, LOG_SQL_MAX),
        "rendered statement"
    );
}

fn log_execute(kind: &'static str, mode: &'static str, sql: &str, params: usize) {
    tracing::debug!(
        target: "qbkit.sql",
        kind,
        mode,
        params,
        sql = truncate_for_log(sql, LOG_SQL_MAX),
        "executing statement"
    );
}

/// Base trait for statement builders.
///
/// `render` always rebuilds the SQL and stores it in the builder's cache;
/// `get_query` only renders when a mutator has run since the last render.
pub trait SqlBuilder: Send {
    /// Statement kind (`SELECT`, `INSERT`, ...), used in logs.
    fn kind(&self) -> &'static str;

    /// Rebuild the SQL text and cache it.
    fn render(&mut self) -> QbResult<&str>;

    fn cache(&self) -> &RenderCache;

    /// Parameters sent alongside the SQL.
    fn params(&self) -> &ParamList;

    /// Whether the cached SQL reflects the current builder state.
    fn is_rendered(&self) -> bool {
        self.cache().is_rendered()
    }

    /// Cached SQL, rendering first if the builder changed.
    fn get_query(&mut self) -> QbResult<&str> {
        if !self.cache().is_rendered() {
            return self.render();
        }
        Ok(self.cache().sql())
    }

    /// Execute the statement and return all rows.
    fn query(
        &mut self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        let kind = self.kind();
        let sql = self.get_query().map(str::to_string);
        let params = self.params().clone();
        async move {
            let sql = sql?;
            log_execute(kind, "simple", &sql, params.len());
            conn.query(&sql, &params.as_refs()).await
        }
    }

    /// Prepare the statement on `conn`, then execute it and return all rows.
    ///
    /// Falls back to [`query`](Self::query) semantics for clients without
    /// prepared statement support.
    fn run(
        &mut self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send {
        let kind = self.kind();
        let sql = self.get_query().map(str::to_string);
        let params = self.params().clone();
        async move {
            let sql = sql?;
            let refs = params.as_refs();
            if !conn.supports_prepared_statements() {
                log_execute(kind, "simple", &sql, params.len());
                return conn.query(&sql, &refs).await;
            }
            log_execute(kind, "prepared", &sql, params.len());
            let stmt = conn.prepare_statement(&sql).await?;
            conn.query_prepared(&stmt, &refs).await
        }
    }
}

/// Trait for mutation builders (INSERT/UPDATE/DELETE).
pub trait MutationBuilder: SqlBuilder {
    /// Execute and return affected row count.
    fn execute(
        &mut self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = QbResult<u64>> + Send {
        let kind = self.kind();
        let sql = self.get_query().map(str::to_string);
        let params = self.params().clone();
        async move {
            let sql = sql?;
            log_execute(kind, "simple", &sql, params.len());
            conn.execute(&sql, &params.as_refs()).await
        }
    }
}
