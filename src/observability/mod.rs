//! Observability subsystem.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job, done through [`logging::init_logging`].

pub mod logging;
