//! The repository operations layer: entity codec, typed result streams and
//! the operations facade that executes point lookups, prepared queries and
//! single-document mutations.

mod codec;
mod cursor;
mod operations;

pub use codec::*;
pub use cursor::*;
pub use operations::*;
