//! # growgraph
//!
//! Library half of the growgraph binary: command-line parsing, command
//! implementations and configuration loading. Exposed so they can be tested
//! from `tests/`.

pub mod cli;
pub mod config;
