//! Library surface for the `meshmock-console` binary.
//!
//! The config parser and the scripted session live here so examples and
//! integration tests can drive them without going through the CLI.

pub mod config;
pub mod service;
