//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements     | Connects to                        |
//! |---------------|----------------|------------------------------------|
//! | `config_file` | ConfigPort     | JSON file on the host              |
//! | `log_sink`    | EventSink      | `log` facade                       |
//! | `sim_radio`   | RadioPort      | in-process medium, per-node mailbox|
//! | `time`        | (clock)        | manual sim clock / `Instant`       |
//!
//! The GPIO indicator adapter lives with the actuator
//! ([`IndicatorPins`](crate::actuator::indicator::IndicatorPins)).

pub mod config_file;
pub mod log_sink;
pub mod sim_radio;
pub mod time;
