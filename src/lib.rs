// ABOUTME: Library root for stelo - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod orchestrate;
pub mod output;
pub mod pathguard;
pub mod runner;
pub mod session;
pub mod shellwords;
pub mod types;
pub mod verify;
