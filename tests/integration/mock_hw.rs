//! Mock adapters for integration tests.
//!
//! Record every frame sent, every LED update and every event emitted so
//! tests can assert on the full history without a real radio or GPIO.

use glasshouse::app::events::AppEvent;
use glasshouse::app::ports::{EventSink, IndicatorPort, Indicators, RadioPort, SamplePort};
use glasshouse::events::Inbound;
use glasshouse::protocol::codec::{decode, encode};
use glasshouse::protocol::{DEFAULT_TOKEN, LinkAddr, Measurements, Message, MessageKind};

// ── Addresses used across tests ───────────────────────────────

pub const SINK: LinkAddr = LinkAddr::from_id(0x0001);
pub const ACTUATOR: LinkAddr = LinkAddr::from_id(0x0002);
pub const SENSOR_A: LinkAddr = LinkAddr::from_id(0x0003);
pub const SENSOR_B: LinkAddr = LinkAddr::from_id(0x0004);
pub const STRANGER: LinkAddr = LinkAddr::from_id(0x00ee);

/// Encode `msg` with the shared token and wrap it as an inbound frame.
pub fn frame(src: LinkAddr, dest: LinkAddr, msg: &Message) -> Inbound {
    Inbound {
        src,
        dest,
        payload: encode(DEFAULT_TOKEN, msg).unwrap(),
    }
}

/// Wrap raw bytes as an inbound frame.
pub fn raw_frame(src: LinkAddr, dest: LinkAddr, bytes: &[u8]) -> Inbound {
    Inbound {
        src,
        dest,
        payload: glasshouse::protocol::Frame::from_slice(bytes).unwrap(),
    }
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    pub addr: LinkAddr,
    pub sent: Vec<(LinkAddr, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new(addr: LinkAddr) -> Self {
        Self {
            addr,
            sent: Vec::new(),
        }
    }

    /// Frames sent to `dest`, oldest first.
    pub fn sent_to(&self, dest: LinkAddr) -> Vec<&[u8]> {
        self.sent
            .iter()
            .filter(|(d, _)| *d == dest)
            .map(|(_, f)| f.as_slice())
            .collect()
    }

    /// Every frame sent to `dest`, decoded as `kind`.
    pub fn decoded(&self, dest: LinkAddr, kind: MessageKind) -> Vec<Message> {
        self.sent_to(dest)
            .into_iter()
            .filter(|f| f.len() == kind.wire_len())
            .filter_map(|f| decode(kind, DEFAULT_TOKEN, f).ok())
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl RadioPort for MockRadio {
    fn local_addr(&self) -> LinkAddr {
        self.addr
    }

    fn send(&mut self, dest: LinkAddr, frame: &[u8]) {
        self.sent.push((dest, frame.to_vec()));
    }
}

// ── MockLeds ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLeds {
    pub history: Vec<Indicators>,
}

#[allow(dead_code)]
impl MockLeds {
    pub fn current(&self) -> Indicators {
        self.history.last().copied().unwrap_or(Indicators::OFF)
    }
}

impl IndicatorPort for MockLeds {
    fn show(&mut self, state: Indicators) {
        self.history.push(state);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FixedSamples ──────────────────────────────────────────────

/// Sample source that always returns the same reading.
pub struct FixedSamples(pub Measurements);

impl SamplePort for FixedSamples {
    fn sample(&mut self) -> Measurements {
        self.0
    }
}
