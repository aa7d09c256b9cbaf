//! Extension contracts for attaching authorizer output to HTTP clients.

pub mod request_signer;

pub use request_signer::*;
