//! Prepared queries and parameter binding.

mod binder;
mod prepared;

pub use binder::*;
pub use prepared::*;
