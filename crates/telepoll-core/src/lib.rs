//! # telepoll-core
//!
//! Core of the long-polling bot runner: update types, the [`Transport`] and
//! [`Handler`] traits, the [`Cursor`], and the poll loop itself.
//!
//! [`Transport`]: traits::Transport
//! [`Handler`]: traits::Handler
//! [`Cursor`]: cursor::Cursor

pub mod config;
pub mod cursor;
pub mod error;
pub mod offset_store;
pub mod runner;
pub mod traits;
pub mod types;

pub use runner::{LongPollingRunner, RunnerOptions, RunnerState, SessionReport};
