//! Everything that talks to the upstream catalog service.

pub mod catalog;
pub mod client;
pub mod error;
pub mod format;
pub mod normalize;
#[cfg(test)]
pub(crate) mod testing;
