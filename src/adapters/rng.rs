//! Random word source for the location simulator.
//!
//! - **`target_os = "espidf"`**: the hardware RNG (`esp_random()`).  True
//!   entropy while the radio is on, which it always is here.
//! - **`not(target_os = "espidf")`**: xorshift32.  Seeded from
//!   `RandomState` by default, or from a fixed seed for reproducible tests.

use crate::app::ports::RandomPort;

#[derive(Debug, Clone)]
pub struct HardwareRng {
    #[cfg(not(target_os = "espidf"))]
    state: u32,
}

impl Default for HardwareRng {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareRng {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let seed = RandomState::new().build_hasher().finish();
        Self::seeded((seed ^ (seed >> 32)) as u32)
    }

    /// Deterministic sequence.  A zero seed is remapped, xorshift would
    /// otherwise stay at zero forever.
    #[cfg(not(target_os = "espidf"))]
    pub fn seeded(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl RandomPort for HardwareRng {
    #[cfg(target_os = "espidf")]
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random has no preconditions.
        unsafe { esp_idf_sys::esp_random() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
