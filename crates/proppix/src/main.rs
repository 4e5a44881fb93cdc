//! # proppix CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, this file only calls
//! `cli::run()` and handles process termination.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/proppix/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - store wiring + dispatch (commands.rs)                    │
//! │  - terminal rendering (render.rs)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/proppixapp/src/api.rs)                   │
//! │  - session gate, upload validation                          │
//! │  - open / edit / save photo sessions                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every CLI action is one immediately-synced edit, the way the backoffice's standalone
//! photo manager behaves. Photos are stored under the data directory with the
//! filesystem backends.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
