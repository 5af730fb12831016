//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the device context, the location simulator, the
//! interval timers and the link manager.  All I/O flows through port
//! traits injected at call sites, so the whole loop runs under test with
//! mock adapters and a virtual clock.
//!
//! ```text
//!  SensorPort  ──▶ ┌──────────────────────────┐ ──▶ PublishPort
//!  DisplayPort ◀── │        AppService        │ ──▶ EventSink
//!  ConnectivityPort│ Scheduler · Link · GeoSim│
//!                  └──────────────────────────┘
//! ```
//!
//! One [`run_once`](AppService::run_once) call is one main-loop
//! iteration; the caller sleeps `loop_delay_ms` between calls.

use log::{info, warn};

use crate::app::context::{DeviceContext, GeoPosition, SensorReading};
use crate::app::events::AppEvent;
use crate::app::ports::{
    ClockPort, ConfigError, ConnectivityPort, DisplayPort, EventSink, PublishPort, RandomPort,
    SchedulerDelegate, SensorPort, TimerKind,
};
use crate::config::SystemConfig;
use crate::display;
use crate::link::{ConnectError, ConnectionManager, LinkState, ReconnectPolicy};
use crate::location::{GeofenceMode, LocationSimulator};
use crate::scheduler::{Schedule, Scheduler};
use crate::telemetry;

// ───────────────────────────────────────────────────────────────
// Iteration results
// ───────────────────────────────────────────────────────────────

/// What the publish handler managed to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOutcome {
    pub sensors: bool,
    pub geo: bool,
}

/// Summary of one main-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    pub link: Result<(), ConnectError>,
    pub toggled: bool,
    pub published: Option<PublishOutcome>,
}

/// Collects the timers due this iteration so the handlers can run after
/// the scheduler borrow ends.
#[derive(Default)]
struct DueTimers(heapless::Vec<TimerKind, 4>);

impl SchedulerDelegate for DueTimers {
    fn on_timer_fired(&mut self, _label: &str, kind: TimerKind) {
        // At most one entry per slot.
        let _ = self.0.push(kind);
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<R, C> {
    ctx: DeviceContext,
    sim: LocationSimulator<R>,
    scheduler: Scheduler,
    link: ConnectionManager<C>,
    clock: C,
    started: bool,
}

impl<R: RandomPort, C: ClockPort + Clone + 'static> AppService<R, C> {
    /// Construct the service.  Rejects an invalid configuration.
    ///
    /// Timers are not armed until [`start`](Self::start).
    pub fn new(config: SystemConfig, rng: R, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = ReconnectPolicy::from_config(&config);
        let initial = GeofenceMode::from_inside(config.start_inside_geofence);
        Ok(Self {
            ctx: DeviceContext::new(config),
            sim: LocationSimulator::new(rng, initial),
            scheduler: Scheduler::new(),
            link: ConnectionManager::new(policy, clock.clone()),
            clock,
            started: false,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot screen, link up, first position, ready screen.
    ///
    /// A failed initial connect is reported and startup continues; the
    /// loop retries on every iteration.
    pub fn start(
        &mut self,
        hw: &mut impl DisplayPort,
        net: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConnectError> {
        display::render_boot(hw);

        let link = self.link.ensure_connected(net, sink);
        if let Err(e) = &link {
            warn!("AppService: starting offline ({})", e);
        }

        let position = self.sim.generate();
        self.ctx.position = position;
        sink.emit(&AppEvent::PositionGenerated(position));

        let now = self.clock.now_ms();
        self.scheduler.add(
            Schedule {
                label: "geofence",
                kind: TimerKind::GeofenceToggle,
                interval_ms: self.ctx.config.geofence_toggle_interval_ms,
            },
            now,
        );
        self.scheduler.add(
            Schedule {
                label: "publish",
                kind: TimerKind::TelemetryPublish,
                interval_ms: self.ctx.config.publish_interval_ms,
            },
            now,
        );

        let identity = &self.ctx.identity;
        sink.emit(&AppEvent::Started {
            device_id: identity.id().try_into().unwrap_or_default(),
            sensors_topic: identity.sensors_topic().try_into().unwrap_or_default(),
            geo_topic: identity.geo_topic().try_into().unwrap_or_default(),
            mode: self.sim.mode(),
        });
        info!(
            "AppService started: {} -> {}, {}",
            identity.id(),
            identity.sensors_topic(),
            identity.geo_topic()
        );

        display::render_ready(hw, self.sim.mode());
        self.started = true;
        link
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One main-loop iteration: service the client, make sure the link is
    /// up, then run whichever timers are due (toggle before publish).
    ///
    /// Timers run even when the link could not be restored; publishes
    /// then fail and are reported, the display still refreshes.
    pub fn run_once(
        &mut self,
        hw: &mut (impl SensorPort + DisplayPort),
        net: &mut (impl ConnectivityPort + PublishPort),
        sink: &mut impl EventSink,
    ) -> Iteration {
        net.service();
        let link = self.link.ensure_connected(net, sink);

        let mut due = DueTimers::default();
        if self.started {
            self.scheduler.tick(self.clock.now_ms(), &mut due);
        }

        let mut iteration = Iteration {
            link,
            toggled: false,
            published: None,
        };
        for kind in due.0 {
            match kind {
                TimerKind::GeofenceToggle => {
                    self.toggle_geofence(hw, sink);
                    iteration.toggled = true;
                }
                TimerKind::TelemetryPublish => {
                    iteration.published = Some(self.publish_cycle(hw, net, sink));
                }
            }
        }
        iteration
    }

    /// Flip inside/outside and regenerate the position in one step.
    pub fn toggle_geofence(&mut self, hw: &mut impl DisplayPort, sink: &mut impl EventSink) {
        let position = self.sim.toggle();
        self.ctx.position = position;
        let mode = self.sim.mode();
        sink.emit(&AppEvent::GeofenceToggled(mode));
        sink.emit(&AppEvent::PositionGenerated(position));
        display::render_mode(hw, mode);
    }

    /// Read sensors, publish both messages, refresh the position screen.
    pub fn publish_cycle(
        &mut self,
        hw: &mut (impl SensorPort + DisplayPort),
        net: &mut impl PublishPort,
        sink: &mut impl EventSink,
    ) -> PublishOutcome {
        let reading = hw.read_all();
        if !reading.climate_valid {
            sink.emit(&AppEvent::ClimateReadFailed);
        }
        self.ctx.reading = reading;

        let identity = &self.ctx.identity;
        let outcome = PublishOutcome {
            sensors: telemetry::publish_sensor_data(net, identity.sensors_topic(), &reading, sink),
            geo: telemetry::publish_geo_data(net, identity.geo_topic(), &self.ctx.position, sink),
        };

        display::update_lcd(hw, &self.ctx.position);
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> GeofenceMode {
        self.sim.mode()
    }

    pub fn position(&self) -> GeoPosition {
        self.ctx.position
    }

    pub fn last_reading(&self) -> SensorReading {
        self.ctx.reading
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Handle that aborts a reconnect in progress.
    pub fn cancel_token(&self) -> crate::link::CancelToken {
        self.link.cancel_token()
    }

    /// Fires of `kind` since [`start`](Self::start).
    pub fn fire_count(&self, kind: TimerKind) -> u32 {
        self.scheduler.fire_count(kind)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
