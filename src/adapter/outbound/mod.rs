//! Outbound adapters (driven side): implementations of the port traits.

pub mod backend;
