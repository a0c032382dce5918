/// Binding of store queries into a name-keyed function table for template engines.
///
/// This module provides the [`FuncMap`] a renderer looks functions up in, such as
/// `getv "/app/port" "80"` or `ls "/app/upstream"`.
pub mod funcmap;

pub use funcmap::{FuncMap, TemplateFn, STORE_FUNCS};
