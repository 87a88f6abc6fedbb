//! Common types shared across the repository layer: the document tree
//! model, the typed conversion seam, and reserved constants.

mod constants;
mod convertible;
mod document;
mod value;

pub use constants::*;
pub use convertible::*;
pub use document::*;
pub use value::*;

use parking_lot::RwLock;
use std::sync::Arc;

pub type Atomic<T> = Arc<RwLock<T>>;

pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}
