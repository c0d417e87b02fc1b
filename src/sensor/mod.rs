//! Sensor node: join, sample, report.

pub mod sampler;
pub mod service;

pub use sampler::{PERTURB_STEP, RunningMean, Sampler};
pub use service::{SensorService, SensorTimer};
