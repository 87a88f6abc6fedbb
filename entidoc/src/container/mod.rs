//! Container identity resolution and provisioning.

mod properties;
mod provisioning;

pub use properties::*;
pub use provisioning::*;
