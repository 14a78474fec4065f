//! `babylog` - Infant care event logging engine
//!
//! This library provides the state-synchronization and view-derivation core
//! for the baby log: reconciling the locally cached roster with the remote
//! event store, deriving analytics from free-text event notes, and running
//! the session stopwatch.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod stopwatch;
pub mod store;

pub use client::{HttpApi, RemoteApi};
pub use config::Config;
pub use controller::{AppState, Controller};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::CacheStore;
