//! Glasshouse sensor/actuator network library.
//!
//! Exposes the pure-logic node services, the shared radio protocol and the
//! host adapters for integration testing and simulation. Nothing here
//! touches real hardware: the radio, the indicator LEDs and the raw
//! sample source are port traits.

#![deny(unused_must_use)]

pub mod actuator;
pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod protocol;
pub mod scheduler;
pub mod sensor;
pub mod sink;

pub use error::{Error, Result};
