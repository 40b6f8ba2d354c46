//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod cli;
pub mod env_guard;
pub mod mock_data;
pub mod mock_server;
pub mod mock_source;

pub use cli::HomesCli;
pub use env_guard::EnvGuard;
pub use mock_data::{ListingBuilder, sample_listings};
pub use mock_server::{MockServer, ServerState};
pub use mock_source::MockSource;
