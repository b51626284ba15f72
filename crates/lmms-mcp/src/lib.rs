//! MCP server for editing, rendering and versioning LMMS projects.
//!
//! Project files are read and written in process through `lmms_project`;
//! only rendering and versioning shell out, to `lmms` and `git`.

pub mod cli_runner;
pub mod config;
pub mod error;
pub mod store;
pub mod tools;
