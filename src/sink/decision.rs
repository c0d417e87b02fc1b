//! Reading → desired actuator command.
//!
//! Each metric drives one command field through a dead-band around its
//! threshold. A field only moves when the reading leaves the band
//! `[threshold - range, threshold + range]`; inside it the previous
//! decision stands.
//!
//! | Metric      | Field             | Polarity |
//! |-------------|-------------------|----------|
//! | temperature | `open_window`     | on above |
//! | humidity    | `open_irrigation` | on below |
//! | light       | `darken`          | on below |
//! | battery     | (advisory only)   |          |

use heapless::Vec;

use crate::config::{MetricBand, Polarity, SinkConfig};
use crate::protocol::message::{Channel, Measurements};
use crate::protocol::ActuatorCommand;

/// A measured quantity in a sensor report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Light,
    Battery,
}

impl Metric {
    /// The actuator channel this metric drives, if any.
    pub const fn channel(self) -> Option<Channel> {
        match self {
            Self::Temperature => Some(Channel::Windows),
            Self::Humidity => Some(Channel::Irrigation),
            Self::Light => Some(Channel::Lights),
            Self::Battery => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Light => "light",
            Self::Battery => "battery",
        }
    }
}

/// Something worth a technician's attention. Never changes the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// Reading outside the plausible range; the metric was skipped.
    SensorFault { metric: Metric, value: i32 },
    LowBattery { battery_mv: i16 },
}

/// Output of one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub command: ActuatorCommand,
    pub advisories: Vec<Advisory, 4>,
}

/// Dead-band step for one field.
pub fn hysteresis(band: &MetricBand, value: i32, current: bool) -> bool {
    let above = value > band.threshold.saturating_add(band.range);
    let below = value < band.threshold.saturating_sub(band.range);
    match band.polarity {
        Polarity::OnAbove if above => true,
        Polarity::OnAbove if below => false,
        Polarity::OnBelow if below => true,
        Polarity::OnBelow if above => false,
        _ => current,
    }
}

/// Per-metric thresholds, fixed at construction.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    temperature: MetricBand,
    humidity: MetricBand,
    light: MetricBand,
    battery_threshold_mv: i32,
}

impl DecisionEngine {
    pub fn new(config: &SinkConfig) -> Self {
        Self {
            temperature: config.temperature,
            humidity: config.humidity,
            light: config.light,
            battery_threshold_mv: config.battery_threshold_mv,
        }
    }

    fn band(&self, metric: Metric) -> Option<&MetricBand> {
        match metric {
            Metric::Temperature => Some(&self.temperature),
            Metric::Humidity => Some(&self.humidity),
            Metric::Light => Some(&self.light),
            Metric::Battery => None,
        }
    }

    /// Compute the next command from `reading`, starting from `previous`.
    pub fn decide(&self, reading: &Measurements, previous: ActuatorCommand) -> Decision {
        let mut command = previous;
        let mut advisories = Vec::new();

        let inputs = [
            (Metric::Temperature, i32::from(reading.temperature)),
            (Metric::Humidity, i32::from(reading.humidity)),
            (Metric::Light, i32::from(reading.light)),
        ];

        for (metric, value) in inputs {
            let (Some(band), Some(channel)) = (self.band(metric), metric.channel()) else {
                continue;
            };
            if !band.is_plausible(value) {
                let _ = advisories.push(Advisory::SensorFault { metric, value });
                continue;
            }
            command.set(channel, hysteresis(band, value, command.get(channel)));
        }

        if i32::from(reading.battery_mv) < self.battery_threshold_mv {
            let _ = advisories.push(Advisory::LowBattery {
                battery_mv: reading.battery_mv,
            });
        }

        Decision {
            command,
            advisories,
        }
    }
}
