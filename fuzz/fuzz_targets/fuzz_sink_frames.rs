//! Fuzz target: `SinkService::on_frame`
//!
//! Interprets the input as a stream of (source, broadcast flag, frame)
//! records and feeds them to a sink with liveness sweeps in between. The
//! sink must never panic and must never hold more sensors than it has
//! room for, or the same sensor twice.
//!
//! cargo fuzz run fuzz_sink_frames

#![no_main]

use glasshouse::app::events::AppEvent;
use glasshouse::app::ports::{EventSink, RadioPort};
use glasshouse::config::SinkConfig;
use glasshouse::events::Inbound;
use glasshouse::protocol::{Frame, LinkAddr, MAX_FRAME_LEN};
use glasshouse::sink::SinkService;
use libfuzzer_sys::fuzz_target;

struct NullRadio;

impl RadioPort for NullRadio {
    fn local_addr(&self) -> LinkAddr {
        LinkAddr::from_id(1)
    }

    fn send(&mut self, _dest: LinkAddr, frame: &[u8]) {
        assert!(frame.len() <= MAX_FRAME_LEN);
    }
}

struct NullEvents;

impl EventSink for NullEvents {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SinkConfig::default();
    let mut sink = SinkService::new(&config);
    let mut radio = NullRadio;
    let mut events = NullEvents;

    let mut now = 0u64;
    let mut rest = data;
    while let [src, flags, len, tail @ ..] = rest {
        let len = usize::from(*len) % (MAX_FRAME_LEN + 1);
        let take = len.min(tail.len());
        let (payload, next) = tail.split_at(take);
        rest = next;

        let dest = if flags & 1 == 1 {
            LinkAddr::BROADCAST
        } else {
            LinkAddr::from_id(1)
        };
        let Ok(payload) = Frame::from_slice(payload) else {
            continue;
        };
        let frame = Inbound {
            src: LinkAddr::from_id(u16::from(*src % 16) + 2),
            dest,
            payload,
        };
        sink.on_frame(&frame, now, &mut radio, &mut events);

        now += u64::from(flags >> 4);
        if flags & 2 == 2 {
            sink.on_liveness_tick(now, &mut events);
        }

        let registry = sink.registry();
        assert!(registry.len() <= config.max_sensor_nodes);
        for (i, a) in registry.iter().enumerate() {
            assert!(registry.iter().skip(i + 1).all(|b| b.address != a.address));
        }
    }
});
