//! Statement builders.
//!
//! Each builder owns its clause state and exposes `&mut self` fluent mutators.
//! Every mutator marks the cached SQL stale; [`SqlBuilder::get_query`]
//! re-renders lazily and [`SqlBuilder::render`] always rebuilds.
//!
//! ## Design
//!
//! - SQL fragments are opaque strings: values are not escaped. Pass untrusted
//!   values through [`ParamList`] placeholders (`$1`, `$2`, ...) instead.
//! - Clauses render in a fixed order and tokens are joined by single spaces.
//! - UPDATE refuses to render without a WHERE condition.
//! - A table or join target can be a nested [`SelectBuilder`].

#[macro_use]
mod macros;

mod commands;
pub mod delete;
pub mod insert;
pub mod param;
pub mod select;
pub mod table;
pub mod traits;
pub mod update;
pub mod where_builder;

pub use commands::RenderCache;
pub use delete::{DeleteBuilder, delete};
pub use insert::{FlushCallback, InsertBuilder, Row, insert};
pub use param::{Param, ParamList};
pub use select::{SelectBuilder, select};
pub use table::{JoinList, JoinSpec, JoinType, TableRef};
pub use traits::{MutationBuilder, SqlBuilder};
pub use update::{UpdateBuilder, update};
pub use where_builder::{WhereBuilder, where_between, where_in, where_in_chunked};

#[cfg(test)]
mod tests;
