//! `qr-sweep-task` library crate.
//!
//! Holds the cleanup task, its connection-factory seam, configuration and
//! the trigger surfaces. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod factory;
pub mod schedule;
pub mod server;
pub mod task;

pub use factory::{ConnectionFactory, PgConnectionFactory, SessionConnection};
pub use task::CleanupTask;
