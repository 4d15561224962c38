//! # qbkit
//!
//! A programmatic SQL statement assembler.
//!
//! ## Features
//!
//! - **Condition chains**: AND/OR chains with explicit parenthesized groups for WHERE / ON / HAVING
//! - **Statement builders**: SELECT, INSERT, UPDATE and DELETE with a fixed clause order
//! - **Lazy rendering**: SQL is cached until the next mutation
//! - **Batched inserts**: a bounded row buffer that flushes through a callback
//! - **Sub-queries**: any table or join target can be a nested SELECT
//! - **Execution**: hand the rendered SQL and parameters to any `GenericClient`
//!
//! Column and value tokens are opaque SQL fragments and are not escaped; bind
//! untrusted values as parameters.
//!
//! ## Example
//!
//! ```
//! use qbkit::{SqlBuilder, select};
//!
//! let mut query = select("users");
//! query
//!     .alias("u")
//!     .columns(["id", "name"])
//!     .where_(["u.age > 18"])
//!     .order_by(["u.name"])
//!     .limit(10);
//!
//! assert_eq!(
//!     query.get_query().unwrap(),
//!     "SELECT id,name FROM users u WHERE u.age > 18 ORDER BY u.name LIMIT 10"
//! );
//! ```
//!
//! ```ignore
//! use qbkit::{MutationBuilder, update};
//!
//! let affected = update("users")
//!     .set_column("status", "$1")
//!     .where_(["id = $2"])
//!     .execute(&client)
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;

pub use builder::{
    DeleteBuilder, InsertBuilder, JoinType, MutationBuilder, Param, ParamList, Row,
    SelectBuilder, SqlBuilder, TableRef, UpdateBuilder, delete, insert, select, update,
    where_between, where_in, where_in_chunked,
};
pub use client::GenericClient;
pub use condition::{ConditionChain, ConditionNode, Connector, Group, Operator};
pub use config::BuilderConfig;
pub use error::{QbError, QbResult};

// Re-export tokio_postgres for convenience
pub use tokio_postgres;
