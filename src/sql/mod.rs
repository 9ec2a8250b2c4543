//! SQL handling for the report pipeline.
//!
//! - [`template`] - `{{param:..}}` / `{{dataset:..}}` placeholder resolution
//! - [`filter`] - column filters rendered as `WHERE` conditions
//! - [`dialect`] - per-backend envelopes and connection targets

pub mod dialect;
pub mod filter;
pub mod template;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Dialect, SqlDialect};
pub use filter::{build_conditions, parse_filters, Filter, FilterOp};
pub use template::{
    resolve, DepthGuard, ResolvedQuery, TemplateResolver, UnresolvedReason, UnresolvedReference,
};
