//! Core domain + application logic for the Franklin paywall bot.
//!
//! This crate is framework-agnostic. Discord and the archive service live
//! behind ports (traits) implemented in adapter crates.

pub mod archive;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod notify;
pub mod pipeline;
pub mod ports;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{Error, Result};
