//! Actuator node.
//!
//! | Module          | Role                                             |
//! |-----------------|--------------------------------------------------|
//! | `channel`       | one channel's on/off, broken and pending flags   |
//! | `state_machine` | command application, break and repair            |
//! | `indicator`     | LED aggregation, `embedded-hal` pin adapter      |
//! | `service`       | join, heartbeat and the node task glue           |

pub mod channel;
pub mod indicator;
pub mod service;
pub mod state_machine;

pub use service::{ActuatorService, ActuatorTimer};
pub use state_machine::ActuatorStateMachine;
