//! Display names - generation and validation

mod generator;
mod policy;

pub use generator::{NameGenerator, RandomNameGenerator};
pub use policy::{normalize, NamePolicy, NameRejection, RestrictedName};
