//! Port traits: the hexagonal boundary between node logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SinkService / ActuatorService / SensorService
//! ```
//!
//! Driven adapters (radio, indicator LEDs, sample source, event sinks,
//! config storage) implement these traits. The node services consume them
//! via generics, so the domain core never touches hardware directly.
//!
//! ## Security notes
//!
//! - The capability token is an equality check, not authentication. Radio
//!   adapters MUST NOT assume a frame that passed it is trustworthy.
//! - **ConfigPort** implementations MUST validate before persisting.

use log::warn;

use crate::protocol::codec::encode;
use crate::protocol::{LinkAddr, Message, Token};

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → link layer)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget link-layer send primitive.
///
/// Delivery is unreliable and unordered. Sending to
/// [`LinkAddr::BROADCAST`] reaches every other node in range.
pub trait RadioPort {
    /// This node's own link-layer address.
    fn local_addr(&self) -> LinkAddr;

    /// Hand one frame to the link layer. Never blocks, never reports loss.
    fn send(&mut self, dest: LinkAddr, frame: &[u8]);

    /// Encode `msg` with `token` and send it. Encoding failures are logged
    /// and the message is dropped.
    fn send_message(&mut self, token: Token, dest: LinkAddr, msg: &Message) {
        match encode(token, msg) {
            Ok(frame) => self.send(dest, &frame),
            Err(e) => warn!("Radio: cannot encode {:?}: {}", msg.kind(), e),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// State of the two indicator LEDs every leaf node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    pub green: bool,
    pub red: bool,
}

impl Indicators {
    pub const OFF: Self = Self {
        green: false,
        red: false,
    };
}

/// Write-side port for the indicator LEDs.
pub trait IndicatorPort {
    /// Drive both indicators to `state`.
    fn show(&mut self, state: Indicators);
}

// ───────────────────────────────────────────────────────────────
// Sample port (driven adapter: hardware → sensor node)
// ───────────────────────────────────────────────────────────────

/// One raw sample per metric, taken on each sampling tick.
pub trait SamplePort {
    fn sample(&mut self) -> crate::protocol::message::Measurements;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Nodes emit structured [`AppEvent`](super::events::AppEvent)s through
/// this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the network configuration.
///
/// # Security
///
/// Implementations MUST call
/// [`SystemConfig::validate`](crate::config::SystemConfig::validate)
/// before persisting and reject invalid values with
/// [`ConfigError::ValidationFailed`], not silently clamp them.
pub trait ConfigPort {
    /// Load configuration. Returns the defaults if nothing is stored.
    fn load(&self) -> Result<crate::config::SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &crate::config::SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples timers from the event queue)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a timer expires. The node runtime implements it by pushing
/// an [`Event::Timer`](crate::events::Event::Timer) into the node's queue.
pub trait SchedulerDelegate<K> {
    fn on_timer_fired(&mut self, key: K, kind: TimerFiredKind);
}

/// Discriminant passed to [`SchedulerDelegate::on_timer_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFiredKind {
    /// A recurring timer fired and has been re-armed.
    Periodic,
    /// A one-shot timer fired and is now disarmed.
    OneShot,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Config("config not found"),
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::IoError => Self::Config("config I/O error"),
        }
    }
}
