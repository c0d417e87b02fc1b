//! Application core plumbing shared by every node kind.
//!
//! Node services hold the domain rules; this module holds what they have
//! in common: the port traits every adapter implements, the structured
//! events they emit, the local commands they accept, the join handshake
//! the two leaf nodes share, and the runtime that drives one node task.
//!
//! ```text
//!  RadioPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │  NodeTask<N>                 │
//!  AppCommand ──▶│  EventQueue · Scheduler · N  │──▶ IndicatorPort
//!                └──────────────────────────────┘
//! ```

pub mod commands;
pub mod events;
pub mod join;
pub mod ports;
pub mod runtime;
