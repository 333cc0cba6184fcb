//! Session orchestration for gridlink.
//!
//! A [`Session`] pairs one [`Network`](gridlink_graph::Network) with one
//! [`TickScheduler`](gridlink_tick::TickScheduler). The external tick
//! source calls the four phase methods; topology operations go through
//! the session so deferred work always lands on the right scheduler.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use session::Session;
