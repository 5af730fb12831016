//! Interval timer engine.
//!
//! Two periodic jobs drive the node: the geofence toggle and the
//! sense-and-publish cycle.  Each is an independent [`Schedule`]; the
//! scheduler checks them against a millisecond clock once per loop
//! iteration and notifies a [`SchedulerDelegate`] for every one that is due.
//!
//! ```text
//!   ┌───────────────────┐   ┌───────────────────┐
//!   │ GeofenceToggle    │   │ TelemetryPublish  │
//!   │ every 120 s       │   │ every 10 s        │
//!   └─────────┬─────────┘   └─────────┬─────────┘
//!             ▼                       ▼
//!   ┌─────────────────────────────────────────────┐
//!   │ SchedulerDelegate::on_timer_fired (in slot  │
//!   │ order, both may fire in the same tick)      │
//!   └─────────────────────────────────────────────┘
//! ```
//!
//! A timer fires once `now - last_fire >= interval` and re-anchors at the
//! fire time, so two fires of the same timer are never closer than its
//! interval.  Missed periods are not replayed.

use crate::app::ports::{SchedulerDelegate, TimerKind};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single periodic timer.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "publish").
    pub label: &'static str,
    pub kind: TimerKind,
    pub interval_ms: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent timers (stack-allocated).
const MAX_SCHEDULES: usize = 4;

pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Clock value at the last fire (or at `add`).
    last_fire_ms: u64,
    fire_count: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// Add a schedule anchored at `now_ms`.  Returns the slot index, or
    /// `None` if full.
    pub fn add(&mut self, schedule: Schedule, now_ms: u64) -> Option<usize> {
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                info!(
                    "Scheduler: added '{}' at slot {} (every {} ms)",
                    schedule.label, i, schedule.interval_ms
                );
                *slot = Some(ScheduleEntry {
                    schedule,
                    last_fire_ms: now_ms,
                    fire_count: 0,
                });
                return Some(i);
            }
        }
        None // All slots full.
    }

    /// Check every timer against `now_ms`.  Call once per loop iteration.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.schedules.iter_mut().flatten() {
            let elapsed = now_ms.saturating_sub(entry.last_fire_ms);
            if elapsed >= u64::from(entry.schedule.interval_ms) {
                entry.last_fire_ms = now_ms;
                entry.fire_count = entry.fire_count.saturating_add(1);
                debug!(
                    "Scheduler: '{}' fired after {} ms (#{})",
                    entry.schedule.label, elapsed, entry.fire_count
                );
                delegate.on_timer_fired(entry.schedule.label, entry.schedule.kind);
            }
        }
    }

    /// Times the timer of `kind` has fired since it was added.
    pub fn fire_count(&self, kind: TimerKind) -> u32 {
        self.schedules
            .iter()
            .flatten()
            .find(|e| e.schedule.kind == kind)
            .map_or(0, |e| e.fire_count)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
