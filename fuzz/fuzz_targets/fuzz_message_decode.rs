//! Fuzz target: `codec::decode`
//!
//! Decodes arbitrary bytes as every message kind and checks that a frame
//! is only ever accepted at its exact size, and that anything accepted
//! encodes back to the same bytes.
//!
//! cargo fuzz run fuzz_message_decode

#![no_main]

use glasshouse::protocol::codec::{decode, encode};
use glasshouse::protocol::{DEFAULT_TOKEN, MessageKind};
use libfuzzer_sys::fuzz_target;

const KINDS: [MessageKind; 6] = [
    MessageKind::Registration,
    MessageKind::RegistrationAck,
    MessageKind::Heartbeat,
    MessageKind::SensorReport,
    MessageKind::ActuatorCommand,
    MessageKind::ActuatorStatus,
];

fuzz_target!(|data: &[u8]| {
    for kind in KINDS {
        let Ok(msg) = decode(kind, DEFAULT_TOKEN, data) else {
            continue;
        };
        assert_eq!(data.len(), kind.wire_len(), "accepted a mis-sized frame");
        assert_eq!(msg.kind(), kind);

        // Booleans decode from any non-zero byte, so only compare for
        // kinds without them.
        if kind != MessageKind::ActuatorCommand {
            let again = encode(DEFAULT_TOKEN, &msg).expect("decoded message must encode");
            assert_eq!(again.as_slice(), data);
        }
    }
});
