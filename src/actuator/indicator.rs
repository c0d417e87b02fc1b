//! Indicator aggregation and GPIO output.
//!
//! Irrigation owns the green LED and windows the red one; lights share
//! both. An LED is lit while any channel mapped to it is physically on,
//! so it is always recomputed from the whole channel set.
//!
//! ```text
//! Irrigation ──┐
//!              ├─ OR ──▶ green
//! Lights ──────┤
//!              ├─ OR ──▶ red
//! Windows ─────┘
//! ```

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{IndicatorPort, Indicators};
use crate::protocol::message::Channel;

use super::channel::ChannelState;

/// LED state implied by the current channel states.
pub fn aggregate(channels: &[ChannelState; Channel::COUNT]) -> Indicators {
    let on = |ch: Channel| channels[ch.index()].physically_on;
    Indicators {
        green: on(Channel::Irrigation) || on(Channel::Lights),
        red: on(Channel::Windows) || on(Channel::Lights),
    }
}

/// [`IndicatorPort`] over two `embedded-hal` output pins.
pub struct IndicatorPins<G, R> {
    green: G,
    red: R,
}

impl<G: OutputPin, R: OutputPin> IndicatorPins<G, R> {
    pub fn new(green: G, red: R) -> Self {
        Self { green, red }
    }

    /// Give the pins back.
    pub fn release(self) -> (G, R) {
        (self.green, self.red)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high { pin.set_high() } else { pin.set_low() }
}

impl<G: OutputPin, R: OutputPin> IndicatorPort for IndicatorPins<G, R> {
    fn show(&mut self, state: Indicators) {
        if let Err(e) = drive(&mut self.green, state.green) {
            warn!("Indicator: green pin: {:?}", e);
        }
        if let Err(e) = drive(&mut self.red, state.red) {
            warn!("Indicator: red pin: {:?}", e);
        }
    }
}
