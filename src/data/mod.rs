// Data module.
// The fetching environment and the local record store behind it.

pub mod environment;
pub mod records;

pub use environment::{Environment, EnvironmentId};

#[cfg(test)]
pub(crate) use environment::testing;
