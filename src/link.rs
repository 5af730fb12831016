//! WiFi + broker link supervision.
//!
//! ```text
//!            is_connected() == false
//!   ┌───────────┐ ───────────────────────▶ ┌──────────────┐
//!   │ Connected │                          │ Disconnected │
//!   └───────────┘ ◀─────────────────────── └──────────────┘
//!                  ensure_connected() = Ok
//! ```
//!
//! Reconnecting runs two stages, WiFi association then broker session.
//! Each stage is retried with exponential backoff (`backon`) and stops
//! early when the attempt budget, the wall-clock budget or a
//! [`CancelToken`] says so.  The outcome is a `Result`, never an endless
//! loop, so an unreachable network costs one bounded stall per call.

use core::cell::Cell;
use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, ConnectivityPort, EventSink};
use crate::config::SystemConfig;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// State / errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    Wifi,
    Broker,
}

impl fmt::Display for LinkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wifi => write!(f, "WiFi"),
            Self::Broker => write!(f, "MQTT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The [`CancelToken`] was raised while retrying.
    Cancelled { stage: LinkStage },
    /// The wall-clock budget ran out.
    TimedOut { stage: LinkStage, attempts: u32 },
    /// Every allowed attempt failed.
    Exhausted {
        stage: LinkStage,
        attempts: u32,
        last: CommsError,
    },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled { stage } => write!(f, "{} reconnect cancelled", stage),
            Self::TimedOut { stage, attempts } => {
                write!(f, "{} reconnect timed out after {} attempts", stage, attempts)
            }
            Self::Exhausted { stage, attempts, last } => {
                write!(f, "{} reconnect gave up after {} attempts ({})", stage, attempts, last)
            }
        }
    }
}

impl core::error::Error for ConnectError {}

// ───────────────────────────────────────────────────────────────
// Cancellation
// ───────────────────────────────────────────────────────────────

/// Shared flag that aborts an in-progress reconnect at the next retry
/// decision.  Cleared again once the cancelled reconnect has returned, or
/// when the link turns out to be healthy and there was nothing to abort.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ───────────────────────────────────────────────────────────────
// Policy
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay_ms: u32,
    pub max_delay_ms: u32,
    /// Total attempts per stage, including the first.
    pub max_attempts: u32,
    /// Wall-clock budget for one `ensure_connected` call.
    pub timeout_ms: u32,
}

impl ReconnectPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            initial_delay_ms: config.reconnect_initial_delay_ms,
            max_delay_ms: config.reconnect_max_delay_ms,
            max_attempts: config.reconnect_max_attempts,
            timeout_ms: config.reconnect_timeout_ms,
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(u64::from(self.initial_delay_ms)))
            .with_max_delay(Duration::from_millis(u64::from(self.max_delay_ms)))
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

// ───────────────────────────────────────────────────────────────
// Manager
// ───────────────────────────────────────────────────────────────

pub struct ConnectionManager<C> {
    policy: ReconnectPolicy,
    clock: C,
    cancel: CancelToken,
    state: LinkState,
}

impl<C: ClockPort + Clone + 'static> ConnectionManager<C> {
    pub fn new(policy: ReconnectPolicy, clock: C) -> Self {
        Self {
            policy,
            clock,
            cancel: CancelToken::new(),
            state: LinkState::Disconnected,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Handle that can abort a reconnect from another context.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Bring WiFi and the broker session up if either is down.
    ///
    /// Returns immediately when both are already up.  Otherwise blocks for
    /// at most the policy's attempt and time budget; the last backoff sleep
    /// is cut short so the budget is never overrun by more than one
    /// connect attempt.
    pub fn ensure_connected(
        &mut self,
        net: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ConnectError> {
        if net.is_connected() {
            // A cancel raised while healthy has no reconnect to abort.
            self.cancel.reset();
            self.set_state(LinkState::Connected, sink);
            return Ok(());
        }
        self.set_state(LinkState::Disconnected, sink);

        let started = self.clock.now_ms();

        if !net.wifi_connected() {
            self.run_stage(LinkStage::Wifi, started, sink, || net.connect_wifi())?;
        }
        if !net.broker_connected() {
            self.run_stage(LinkStage::Broker, started, sink, || net.connect_broker())?;
        }

        self.set_state(LinkState::Connected, sink);
        Ok(())
    }

    fn run_stage<F>(
        &self,
        stage: LinkStage,
        started: u64,
        sink: &mut impl EventSink,
        mut attempt_once: F,
    ) -> Result<(), ConnectError>
    where
        F: FnMut() -> Result<(), CommsError>,
    {
        let attempts = Cell::new(0u32);
        let timeout_ms = u64::from(self.policy.timeout_ms);
        let sleeper = self.clock.clone();
        let budget_left = move |clock: &C| {
            timeout_ms.saturating_sub(clock.now_ms().saturating_sub(started))
        };

        info!("Link: connecting {}", stage);

        let result = (|| {
            attempts.set(attempts.get() + 1);
            attempt_once()
        })
        .retry(self.policy.backoff())
        .sleep(move |d: Duration| {
            sleeper.sleep_ms((d.as_millis() as u64).min(budget_left(&sleeper)));
        })
        .when(|_| {
            !self.cancel.is_cancelled()
                && self.clock.now_ms().saturating_sub(started) < timeout_ms
        })
        .notify(|e: &CommsError, d: Duration| {
            sink.emit(&AppEvent::RetryScheduled {
                stage,
                attempt: attempts.get(),
                delay_ms: (d.as_millis() as u64).min(budget_left(&self.clock)),
                error: *e,
            });
        })
        .call();

        let attempts = attempts.get();
        match result {
            Ok(()) => {
                info!("Link: {} up after {} attempt(s)", stage, attempts);
                Ok(())
            }
            Err(last) => {
                let err = if self.cancel.is_cancelled() {
                    self.cancel.reset();
                    ConnectError::Cancelled { stage }
                } else if self.clock.now_ms().saturating_sub(started) >= timeout_ms {
                    ConnectError::TimedOut { stage, attempts }
                } else {
                    ConnectError::Exhausted { stage, attempts, last }
                };
                warn!("Link: {}", err);
                sink.emit(&AppEvent::ReconnectFailed(err));
                Err(err)
            }
        }
    }

    fn set_state(&mut self, next: LinkState, sink: &mut impl EventSink) {
        if self.state == next {
            return;
        }
        self.state = next;
        match next {
            LinkState::Connected => sink.emit(&AppEvent::LinkUp),
            LinkState::Disconnected => sink.emit(&AppEvent::LinkDown),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
