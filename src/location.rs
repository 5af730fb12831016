//! Simulated GPS source.
//!
//! The node does not parse its positioning receiver.  Instead it alternates
//! between two fixed regions so downstream geofence logic has something
//! to react to:
//!
//! | Mode      | Region                         | Generation                         |
//! |-----------|--------------------------------|------------------------------------|
//! | `Inside`  | Colorado box (named geofence)  | uniform over the box, 1e-6 steps   |
//! | `Outside` | San Francisco                  | center ± 0.01°, 1e-5 steps         |
//!
//! Coordinates and the inside/outside flag are always produced together
//! by one call, so a [`GeoPosition`] never pairs a mode with the other
//! region's coordinates.

use crate::app::context::GeoPosition;
use crate::app::ports::RandomPort;

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

pub const INSIDE_LAT_MIN: f64 = 39.495_387;
pub const INSIDE_LAT_MAX: f64 = 39.529_577;
pub const INSIDE_LON_MIN: f64 = -107.744_122;
pub const INSIDE_LON_MAX: f64 = -107.653_999;

pub const OUTSIDE_CENTER_LAT: f64 = 37.7749;
pub const OUTSIDE_CENTER_LON: f64 = -122.4194;
/// Maximum offset from the outside center, in degrees.
pub const OUTSIDE_JITTER_DEG: f64 = 0.01;

/// Resolution of the inside-box fraction (6 decimals).
const FRACTION_STEPS: u32 = 1_000_000;
/// Jitter is drawn as an integer in `-JITTER_STEPS..=JITTER_STEPS`.
const JITTER_STEPS: i32 = 1_000;
const JITTER_SCALE: f64 = 100_000.0;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceMode {
    Inside,
    Outside,
}

impl GeofenceMode {
    pub fn from_inside(inside: bool) -> Self {
        if inside { Self::Inside } else { Self::Outside }
    }

    pub fn is_inside(self) -> bool {
        self == Self::Inside
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Inside => Self::Outside,
            Self::Outside => Self::Inside,
        }
    }

    /// `INSIDE` / `OUTSIDE`, used by the banner and LCD mode line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inside => "INSIDE",
            Self::Outside => "OUTSIDE",
        }
    }

    /// `IN` / `OUT`, the LCD position line prefix.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Inside => "IN",
            Self::Outside => "OUT",
        }
    }

    /// Wire value of the `status` field.
    pub fn status(self) -> &'static str {
        match self {
            Self::Inside => "inside_geofence",
            Self::Outside => "outside_geofence",
        }
    }
}

// ---------------------------------------------------------------------------
// Random helpers
// ---------------------------------------------------------------------------

/// Uniform integer in `lo..=hi`.  Modulo bias is irrelevant at these spans.
fn uniform_inclusive(rng: &mut impl RandomPort, lo: i32, hi: i32) -> i32 {
    debug_assert!(lo <= hi);
    let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
    lo + (u64::from(rng.next_u32()) % span) as i32
}

fn lerp_clamped(lo: f64, hi: f64, frac: f64) -> f64 {
    (lo + frac * (hi - lo)).clamp(lo.min(hi), lo.max(hi))
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct LocationSimulator<R> {
    rng: R,
    mode: GeofenceMode,
}

impl<R: RandomPort> LocationSimulator<R> {
    pub fn new(rng: R, initial: GeofenceMode) -> Self {
        Self { rng, mode: initial }
    }

    pub fn mode(&self) -> GeofenceMode {
        self.mode
    }

    /// Generate a fresh position for the current mode.
    pub fn generate(&mut self) -> GeoPosition {
        generate_position(&mut self.rng, self.mode)
    }

    /// Flip the mode and regenerate in the same step.
    pub fn toggle(&mut self) -> GeoPosition {
        self.mode = self.mode.toggled();
        self.generate()
    }
}

/// Draw a position for `mode`.  `valid` is always set.
pub fn generate_position(rng: &mut impl RandomPort, mode: GeofenceMode) -> GeoPosition {
    let (latitude, longitude) = match mode {
        GeofenceMode::Inside => {
            let steps = FRACTION_STEPS as i32;
            let lat_frac = f64::from(uniform_inclusive(rng, 0, steps)) / f64::from(FRACTION_STEPS);
            let lon_frac = f64::from(uniform_inclusive(rng, 0, steps)) / f64::from(FRACTION_STEPS);
            (
                lerp_clamped(INSIDE_LAT_MIN, INSIDE_LAT_MAX, lat_frac),
                lerp_clamped(INSIDE_LON_MIN, INSIDE_LON_MAX, lon_frac),
            )
        }
        GeofenceMode::Outside => {
            let lat_off = f64::from(uniform_inclusive(rng, -JITTER_STEPS, JITTER_STEPS)) / JITTER_SCALE;
            let lon_off = f64::from(uniform_inclusive(rng, -JITTER_STEPS, JITTER_STEPS)) / JITTER_SCALE;
            (
                (OUTSIDE_CENTER_LAT + lat_off).clamp(
                    OUTSIDE_CENTER_LAT - OUTSIDE_JITTER_DEG,
                    OUTSIDE_CENTER_LAT + OUTSIDE_JITTER_DEG,
                ),
                (OUTSIDE_CENTER_LON + lon_off).clamp(
                    OUTSIDE_CENTER_LON - OUTSIDE_JITTER_DEG,
                    OUTSIDE_CENTER_LON + OUTSIDE_JITTER_DEG,
                ),
            )
        }
    };

    GeoPosition {
        latitude,
        longitude,
        inside_geofence: mode.is_inside(),
        valid: true,
    }
}
