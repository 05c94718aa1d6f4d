//! Inbound adapters (driving side): the command-line interface.

pub mod cli;
