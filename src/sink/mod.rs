//! Sink (coordinator) node.
//!
//! | Module     | Role                                               |
//! |------------|----------------------------------------------------|
//! | `registry` | bounded sensor table, actuator link                |
//! | `liveness` | periodic staleness sweep                           |
//! | `decision` | per-metric hysteresis and fault filtering          |
//! | `differ`   | last-sent command, redundant-send suppression      |
//! | `service`  | frame routing and the node task glue               |

pub mod decision;
pub mod differ;
pub mod liveness;
pub mod registry;
pub mod service;

pub use service::{SinkService, SinkStats, SinkTimer};
