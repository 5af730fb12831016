//! Fuzz target: `dht22::decode_frame`
//!
//! Any 5-byte frame either fails the checksum or decodes to values inside
//! what the 16-bit fields can express.  Never panics.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use geofence_node::error::SensorError;
use geofence_node::sensors::dht22::{FRAME_LEN, decode_frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(bytes) = data.get(..FRAME_LEN) else {
        return;
    };
    let mut frame = [0u8; FRAME_LEN];
    frame.copy_from_slice(bytes);

    let sum = frame[..4].iter().fold(0u8, |a, b| a.wrapping_add(*b));
    match decode_frame(&frame) {
        Ok(r) => {
            assert_eq!(sum, frame[4], "accepted a frame with a bad checksum");
            assert!(r.humidity_pct.is_finite() && (0.0..=6553.5).contains(&r.humidity_pct));
            assert!(r.temperature_c.is_finite() && r.temperature_c.abs() <= 3276.7);
        }
        Err(e) => {
            assert_eq!(e, SensorError::Checksum);
            assert_ne!(sum, frame[4]);
        }
    }
});
