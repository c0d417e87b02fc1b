//! System configuration parameters
//!
//! All tunable parameters for the sink, the actuator and sensor nodes.
//! Values can be overridden from a JSON file (see
//! [`JsonConfigFile`](crate::adapters::config_file::JsonConfigFile)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::protocol::message::{DEFAULT_TOKEN, Token};
use crate::sink::registry::MAX_SENSOR_NODES;

/// Which way a metric drives its command field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Field goes on above the band, off below it (hot ⇒ open window).
    OnAbove,
    /// Field goes on below the band, off above it (dry ⇒ irrigate).
    OnBelow,
}

/// Hysteresis band plus plausibility window for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBand {
    pub threshold: i32,
    /// Half-width of the dead-band around `threshold`.
    pub range: i32,
    /// Readings below this are treated as a faulty sensor.
    pub plausible_min: i32,
    /// Readings above this are treated as a faulty sensor.
    pub plausible_max: i32,
    pub polarity: Polarity,
}

impl MetricBand {
    pub fn is_plausible(&self, value: i32) -> bool {
        (self.plausible_min..=self.plausible_max).contains(&value)
    }
}

/// Coordinator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub token: Token,
    /// Registry capacity (at most [`MAX_SENSOR_NODES`]).
    pub max_sensor_nodes: usize,

    // --- Liveness ---
    pub sensor_timeout_secs: u64,
    pub actuator_timeout_secs: u64,
    /// Sweep period; at least twice the largest timeout.
    pub liveness_period_secs: u64,

    // --- Decision ---
    /// Drives `open_window`.
    pub temperature: MetricBand,
    /// Drives `open_irrigation`.
    pub humidity: MetricBand,
    /// Drives `darken` (lights).
    pub light: MetricBand,
    /// Reports below this raise a low-battery advisory.
    pub battery_threshold_mv: i32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN,
            max_sensor_nodes: 4,

            sensor_timeout_secs: 15,
            actuator_timeout_secs: 15,
            liveness_period_secs: 30,

            temperature: MetricBand {
                threshold: 10,
                range: 1,
                plausible_min: -40,
                plausible_max: 60,
                polarity: Polarity::OnAbove,
            },
            humidity: MetricBand {
                threshold: 10,
                range: 1,
                plausible_min: 0,
                plausible_max: 100,
                polarity: Polarity::OnBelow,
            },
            light: MetricBand {
                threshold: 10,
                range: 1,
                plausible_min: 0,
                plausible_max: 1000,
                polarity: Polarity::OnBelow,
            },
            battery_threshold_mv: 800,
        }
    }
}

/// Parameters shared by the two kinds of leaf node for joining the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Re-broadcasts after the first registration before giving up.
    pub max_retries: u8,
    /// Delay between broadcasts.
    pub retry_secs: u64,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_secs: 1,
        }
    }
}

/// Actuator node parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub token: Token,
    pub join: JoinConfig,
    pub heartbeat_period_secs: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN,
            join: JoinConfig::default(),
            heartbeat_period_secs: 10,
        }
    }
}

/// Sensor node parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub token: Token,
    pub join: JoinConfig,
    pub sampling_period_secs: u64,
    pub reporting_period_secs: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN,
            join: JoinConfig::default(),
            sampling_period_secs: 2,
            reporting_period_secs: 9,
        }
    }
}

/// Accepted range for sampling/reporting periods set at runtime.
pub const PERIOD_RANGE_SECS: core::ops::RangeInclusive<u64> = 1..=9;

/// Whole-network configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    pub sink: SinkConfig,
    pub actuator: ActuatorConfig,
    pub sensor: SensorConfig,
}

impl SystemConfig {
    /// Reject unsafe values instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sink;
        if s.max_sensor_nodes == 0 || s.max_sensor_nodes > MAX_SENSOR_NODES {
            return Err(ConfigError::ValidationFailed(
                "sink.max_sensor_nodes must be within the registry's capacity",
            ));
        }
        if s.sensor_timeout_secs == 0 || s.actuator_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("liveness timeouts must be non-zero"));
        }
        let largest = s.sensor_timeout_secs.max(s.actuator_timeout_secs);
        if s.liveness_period_secs < largest.saturating_mul(2) {
            return Err(ConfigError::ValidationFailed(
                "sink.liveness_period_secs must be at least twice the largest timeout",
            ));
        }
        for band in [&s.temperature, &s.humidity, &s.light] {
            if band.range < 0 {
                return Err(ConfigError::ValidationFailed("dead-band range must be >= 0"));
            }
            if band.plausible_min > band.plausible_max {
                return Err(ConfigError::ValidationFailed("plausible_min must be <= plausible_max"));
            }
        }

        let a = &self.actuator;
        if a.heartbeat_period_secs == 0 || a.heartbeat_period_secs >= s.actuator_timeout_secs {
            return Err(ConfigError::ValidationFailed(
                "actuator.heartbeat_period_secs must be below the actuator timeout",
            ));
        }

        let n = &self.sensor;
        if !PERIOD_RANGE_SECS.contains(&n.sampling_period_secs)
            || !PERIOD_RANGE_SECS.contains(&n.reporting_period_secs)
        {
            return Err(ConfigError::ValidationFailed(
                "sensor sampling/reporting periods must be 1..=9 s",
            ));
        }
        if n.reporting_period_secs >= s.sensor_timeout_secs {
            return Err(ConfigError::ValidationFailed(
                "sensor.reporting_period_secs must be below the sensor timeout",
            ));
        }

        for join in [&a.join, &n.join] {
            if join.max_retries == 0 || join.retry_secs == 0 {
                return Err(ConfigError::ValidationFailed(
                    "join retries and delay must be non-zero",
                ));
            }
        }

        if s.token != a.token || s.token != n.token {
            return Err(ConfigError::ValidationFailed("all nodes must share one token"));
        }
        Ok(())
    }
}
