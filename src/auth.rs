//! Credential identity, key material, and cached token models.

pub mod id;
pub mod key;
pub mod token;

pub use id::*;
pub use key::*;
pub use token::{cached::*, secret::*};
