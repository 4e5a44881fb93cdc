//! # CLI Layer
//!
//! This module is **one possible UI client** for proppix; it is not the application.
//! It is the only place that knows about terminal I/O, argument parsing and exit codes.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap (`setup.rs`)
//! 2. **Context Setup**: data directory, config, filesystem stores, logging
//! 3. **API Dispatch**: one `PhotosApi` call per command (`commands.rs`)
//! 4. **Output Formatting**: photo lists and sync reports (`render.rs`)
//!
//! Positions on the command line are 1-based, as printed by `list`.

mod commands;
mod render;
mod setup;

pub use commands::run;
