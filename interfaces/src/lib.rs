pub mod defs;
pub mod query;

pub use defs::*;
pub use query::ArticleQuery;
