//! Header values and their cache lifetimes.

pub mod cached;
pub mod secret;
