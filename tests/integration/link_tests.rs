//! ConnectionManager against the mock network: backoff schedule,
//! stage ordering, give-up conditions.

use crate::mock_hw::{FakeClock, MockNetwork, RecordingSink};

use geofence_node::app::events::AppEvent;
use geofence_node::app::ports::ClockPort;
use geofence_node::config::SystemConfig;
use geofence_node::error::CommsError;
use geofence_node::link::{ConnectError, ConnectionManager, LinkStage, LinkState, ReconnectPolicy};

fn manager(policy: ReconnectPolicy) -> (ConnectionManager<FakeClock>, MockNetwork, RecordingSink, FakeClock) {
    let clock = FakeClock::default();
    (
        ConnectionManager::new(policy, clock.clone()),
        MockNetwork::new(clock.clone()),
        RecordingSink::new(),
        clock,
    )
}

fn retry_delays(sink: &RecordingSink) -> Vec<u64> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::RetryScheduled { delay_ms, .. } => Some(*delay_ms),
            _ => None,
        })
        .collect()
}

#[test]
fn default_policy_backs_off_exponentially() {
    let policy = ReconnectPolicy::from_config(&SystemConfig::default());
    let (mut mgr, mut net, mut sink, clock) = manager(policy);
    net.wifi_failures = 4;

    assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());
    assert_eq!(retry_delays(&sink), vec![1_000, 2_000, 4_000, 8_000]);
    assert_eq!(clock.now_ms(), 15_000);
    assert_eq!(net.wifi_attempts, 5);
    assert_eq!(net.broker_attempts, 1);
}

#[test]
fn delay_is_capped() {
    let policy = ReconnectPolicy {
        initial_delay_ms: 1_000,
        max_delay_ms: 3_000,
        max_attempts: 5,
        timeout_ms: 600_000,
    };
    let (mut mgr, mut net, mut sink, _clock) = manager(policy);
    net.broker_failures = 4;

    assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());
    assert_eq!(retry_delays(&sink), vec![1_000, 2_000, 3_000, 3_000]);
}

#[test]
fn broker_stage_failure_is_attributed_to_broker() {
    let policy = ReconnectPolicy {
        initial_delay_ms: 10,
        max_delay_ms: 10,
        max_attempts: 3,
        timeout_ms: 600_000,
    };
    let (mut mgr, mut net, mut sink, _clock) = manager(policy);
    net.broker_failures = u32::MAX;

    let err = mgr.ensure_connected(&mut net, &mut sink).unwrap_err();
    assert_eq!(
        err,
        ConnectError::Exhausted {
            stage: LinkStage::Broker,
            attempts: 3,
            last: CommsError::BrokerConnectFailed,
        }
    );
    assert!(net.wifi_up);
    assert_eq!(mgr.state(), LinkState::Disconnected);
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::ReconnectFailed(ConnectError::Exhausted { .. }))
    ));
}

#[test]
fn unreachable_network_costs_exactly_the_time_budget() {
    let policy = ReconnectPolicy {
        initial_delay_ms: 1_000,
        max_delay_ms: 30_000,
        max_attempts: 1_000,
        timeout_ms: 20_000,
    };
    let (mut mgr, mut net, mut sink, clock) = manager(policy);
    net.wifi_failures = u32::MAX;

    let err = mgr.ensure_connected(&mut net, &mut sink).unwrap_err();
    assert!(matches!(err, ConnectError::TimedOut { stage: LinkStage::Wifi, .. }));
    // 1 + 2 + 4 + 8 s, then the 16 s delay is cut to the last 5 s.
    assert_eq!(clock.now_ms(), 20_000);
    assert_eq!(retry_delays(&sink), vec![1_000, 2_000, 4_000, 8_000, 5_000]);
}

#[test]
fn cancelled_reconnect_returns_and_next_call_retries() {
    let policy = ReconnectPolicy::from_config(&SystemConfig::default());
    let (mut mgr, mut net, mut sink, _clock) = manager(policy);
    net.wifi_failures = u32::MAX;

    mgr.cancel_token().cancel();
    let err = mgr.ensure_connected(&mut net, &mut sink).unwrap_err();
    assert_eq!(err, ConnectError::Cancelled { stage: LinkStage::Wifi });
    assert_eq!(net.wifi_attempts, 1);

    net.wifi_failures = 0;
    assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());
    assert_eq!(mgr.state(), LinkState::Connected);
}

#[test]
fn cancel_while_healthy_does_not_abort_a_later_reconnect() {
    let policy = ReconnectPolicy::from_config(&SystemConfig::default());
    let (mut mgr, mut net, mut sink, _clock) = manager(policy);
    net.wifi_up = true;
    net.broker_up = true;

    mgr.cancel_token().cancel();
    assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());

    net.drop_link();
    net.wifi_failures = 1;
    assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());
    assert_eq!(net.wifi_attempts, 2);
    assert_eq!(mgr.state(), LinkState::Connected);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ReconnectFailed(_))), 0);
}

#[test]
fn healthy_link_makes_no_attempts() {
    let policy = ReconnectPolicy::from_config(&SystemConfig::default());
    let (mut mgr, mut net, mut sink, _clock) = manager(policy);
    net.wifi_up = true;
    net.broker_up = true;

    for _ in 0..5 {
        assert!(mgr.ensure_connected(&mut net, &mut sink).is_ok());
    }
    assert_eq!(net.wifi_attempts + net.broker_attempts, 0);
    // One LinkUp on the first transition only.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LinkUp)), 1);
}
