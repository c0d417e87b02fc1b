//! Local inputs to a node service.
//!
//! These stand in for the buttons and the settings console: actions the
//! node's operator requests, as opposed to frames arriving over the radio.

/// Commands that local adapters can send into a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start looking for the sink (leaf nodes, when disconnected).
    Connect,

    /// Leave the network and stop periodic work (sensor node).
    Disconnect,

    /// Break one working channel chosen at random (actuator, joined).
    BreakRandom,

    /// Repair the highest-priority broken channel (actuator).
    Repair,

    /// Shift the next reported mean of one metric by a fixed step, cycling
    /// through the metrics (sensor node, joined). Used to exercise the
    /// sink's decisions by hand.
    Perturb,

    /// Change how often samples are taken, in seconds (sensor node).
    SetSamplingPeriod(u64),

    /// Change how often reports are sent, in seconds (sensor node).
    SetReportingPeriod(u64),
}
