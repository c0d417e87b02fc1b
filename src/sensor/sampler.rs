//! Integer running means over raw samples.

use crate::protocol::message::Measurements;

/// Cumulative integer mean: `mean' = (mean * n + x) / (n + 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningMean {
    value: i64,
    samples: u32,
}

impl RunningMean {
    pub fn push(&mut self, sample: i64) -> i64 {
        let n = i64::from(self.samples);
        self.value = (self.value * n + sample) / (n + 1);
        self.samples = self.samples.saturating_add(1);
        self.value
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Move the mean without counting a sample.
    pub fn shift(&mut self, delta: i64) {
        self.value = self.value.saturating_add(delta);
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }
}

/// Size of one manual perturbation step.
pub const PERTURB_STEP: i64 = 10;

/// One running mean per reported metric.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    temperature: RunningMean,
    humidity: RunningMean,
    light: RunningMean,
    battery_mv: RunningMean,
    /// Metric the next [`Sampler::perturb`] shifts, cycling 0..4.
    next_perturbed: usize,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw sample per metric into the means.
    pub fn fold(&mut self, raw: &Measurements) {
        self.temperature.push(i64::from(raw.temperature));
        self.humidity.push(i64::from(raw.humidity));
        self.light.push(i64::from(raw.light));
        self.battery_mv.push(i64::from(raw.battery_mv));
    }

    pub fn samples(&self) -> u32 {
        self.temperature.samples()
    }

    /// Shift one mean by [`PERTURB_STEP`], cycling through temperature,
    /// humidity and light (upwards) and battery (downwards). Returns the
    /// means after the shift.
    pub fn perturb(&mut self) -> Measurements {
        match self.next_perturbed {
            0 => self.temperature.shift(PERTURB_STEP),
            1 => self.humidity.shift(PERTURB_STEP),
            2 => self.light.shift(PERTURB_STEP),
            _ => self.battery_mv.shift(-PERTURB_STEP),
        }
        self.next_perturbed = (self.next_perturbed + 1) % 4;
        self.means()
    }

    /// Current means, saturated to the wire widths.
    pub fn means(&self) -> Measurements {
        Measurements {
            temperature: to_i16(self.temperature.value()),
            humidity: self.humidity.value().clamp(0, i64::from(u16::MAX)) as u16,
            light: to_i16(self.light.value()),
            battery_mv: to_i16(self.battery_mv.value()),
        }
    }
}

fn to_i16(v: i64) -> i16 {
    v.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}
