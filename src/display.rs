//! Status screens for the 16x2 character LCD.
//!
//! Line text is built into fixed 16-column strings; anything longer is
//! cut at the panel edge.  Write failures are logged and otherwise
//! ignored, the display is informational only.

use core::fmt::Write;

use log::warn;

use crate::app::context::GeoPosition;
use crate::app::ports::DisplayPort;
use crate::error::DisplayError;
use crate::location::GeofenceMode;

pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: u8 = 2;

pub type LineString = heapless::String<LCD_COLS>;

/// Format into a panel-width line, truncating on overflow.
fn line(args: core::fmt::Arguments<'_>) -> LineString {
    let mut out = LineString::new();
    let mut full = heapless::String::<64>::new();
    let _ = full.write_fmt(args);
    for c in full.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Line 1 of the position screen: `GPS: 39.5120`.
pub fn position_line_1(p: &GeoPosition) -> LineString {
    line(format_args!("GPS: {:.4}", p.latitude))
}

/// Line 2 of the position screen: `IN: -107.7001` / `OUT: -122.4194`.
pub fn position_line_2(p: &GeoPosition) -> LineString {
    line(format_args!("{}: {:.4}", p.mode().short_label(), p.longitude))
}

/// `Mode: INSIDE` / `Mode: OUTSIDE`.
pub fn mode_line(mode: GeofenceMode) -> LineString {
    line(format_args!("Mode: {}", mode.label()))
}

fn render(display: &mut impl DisplayPort, rows: &[(u8, &str)]) {
    let result = (|| -> Result<(), DisplayError> {
        display.clear()?;
        for (row, text) in rows {
            display.write_line(*row, text)?;
        }
        Ok(())
    })();
    if let Err(e) = result {
        warn!("LCD: update failed ({})", e);
    }
}

/// Shown while peripherals and the link come up.
pub fn render_boot(display: &mut impl DisplayPort) {
    render(display, &[(0, "Initializing...")]);
}

/// Shown once startup completes.
pub fn render_ready(display: &mut impl DisplayPort, mode: GeofenceMode) {
    let mode = mode_line(mode);
    render(display, &[(0, "Device Ready"), (1, mode.as_str())]);
}

/// Shown right after a geofence toggle, until the next publish cycle.
pub fn render_mode(display: &mut impl DisplayPort, mode: GeofenceMode) {
    let mode = mode_line(mode);
    render(display, &[(1, mode.as_str())]);
}

/// Current coordinates and inside/outside status.
pub fn update_lcd(display: &mut impl DisplayPort, p: &GeoPosition) {
    let l1 = position_line_1(p);
    let l2 = position_line_2(p);
    render(display, &[(0, l1.as_str()), (1, l2.as_str())]);
}
