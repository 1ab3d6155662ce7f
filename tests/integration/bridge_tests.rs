//! Integration tests for the sensor → TouchBridge → publisher pipeline.
//!
//! All of these run on the host against the scripted sensor and the
//! recording publisher from `mock_hw`.

use std::time::Duration;

use crate::mock_hw::{RecordingPublisher, RecordingSink, ScriptedSensor, Step};

use picap_mqtt::app::cancel::CancelToken;
use picap_mqtt::app::events::{BridgeEvent, TouchKind};
use picap_mqtt::app::service::TouchBridge;
use picap_mqtt::app::topics::FeedTopics;
use picap_mqtt::config::{Invocation, parse_invocation};
use picap_mqtt::error::{Error, PublishError, SensorError};

fn bridge_for(username: Option<&str>) -> TouchBridge {
    TouchBridge::new(FeedTopics::new(username))
}

// ── Single-cycle properties ───────────────────────────────────

#[test]
fn new_touch_publishes_once_on_touched_feed() {
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([Step::Mask(1 << 2)]);
    let mut out = RecordingPublisher::new();

    let n = bridge
        .poll_once(&mut sensor, &mut out, &mut RecordingSink::new())
        .unwrap();

    assert_eq!(n, 1);
    assert_eq!(out.sent, vec![("/feeds/picap-touched".to_owned(), "2".to_owned())]);
}

#[test]
fn unchanged_cycle_skips_refresh_and_channel_checks() {
    let mut bridge = bridge_for(Some("alice"));
    let mut sensor = ScriptedSensor::new([Step::Unchanged]);
    let mut out = RecordingPublisher::new();

    let n = bridge
        .poll_once(&mut sensor, &mut out, &mut RecordingSink::new())
        .unwrap();

    assert_eq!(n, 0);
    assert_eq!(sensor.change_checks, 1);
    assert_eq!(sensor.refreshes, 0);
    assert_eq!(sensor.edge_checks.get(), 0);
    assert!(out.sent.is_empty());
}

#[test]
fn changed_cycle_checks_every_channel() {
    let mut bridge = bridge_for(None);
    // Channel 0 touched; every other channel needs both predicates.
    let mut sensor = ScriptedSensor::new([Step::Mask(0b1)]);
    bridge
        .poll_once(&mut sensor, &mut RecordingPublisher::new(), &mut RecordingSink::new())
        .unwrap();

    assert_eq!(sensor.refreshes, 1);
    // One check for the touched channel, two for each of the other eleven.
    assert_eq!(sensor.edge_checks.get(), 1 + 2 * 11);
}

#[test]
fn alice_channel_three_touch() {
    let config = match parse_invocation(["picap-mqtt", "-b", "test.broker:1883", "-u", "alice"]) {
        Invocation::Run(c) => c,
        Invocation::Usage => panic!("expected a runnable config"),
    };
    let mut bridge = TouchBridge::new(FeedTopics::new(config.username()));
    let mut sensor = ScriptedSensor::new([Step::Mask(1 << 3)]);
    let mut out = RecordingPublisher::new();

    bridge
        .poll_once(&mut sensor, &mut out, &mut RecordingSink::new())
        .unwrap();

    assert_eq!(
        out.sent,
        vec![("alice/feeds/picap-touched".to_owned(), "3".to_owned())]
    );
}

#[test]
fn anonymous_channel_seven_release() {
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::with_snapshot(1 << 7, 0);
    let mut out = RecordingPublisher::new();

    bridge
        .poll_once(&mut sensor, &mut out, &mut RecordingSink::new())
        .unwrap();

    assert_eq!(
        out.sent,
        vec![("/feeds/picap-released".to_owned(), "7".to_owned())]
    );
}

#[test]
fn held_channels_do_not_republish() {
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([Step::Mask(0b01), Step::Mask(0b11)]);
    let mut out = RecordingPublisher::new();
    let mut sink = RecordingSink::new();

    bridge.poll_once(&mut sensor, &mut out, &mut sink).unwrap();
    bridge.poll_once(&mut sensor, &mut out, &mut sink).unwrap();

    assert_eq!(out.sent.len(), 2);
    assert_eq!(out.sent[0].1, "0");
    assert_eq!(out.sent[1].1, "1");
}

#[test]
fn published_events_reach_the_sink() {
    let mut bridge = bridge_for(Some("carol"));
    let mut sensor = ScriptedSensor::with_snapshot(0b10, 0b01);
    let mut sink = RecordingSink::new();

    bridge
        .poll_once(&mut sensor, &mut RecordingPublisher::new(), &mut sink)
        .unwrap();

    let kinds: Vec<(u8, TouchKind, String)> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            BridgeEvent::Published { event, topic } => {
                Some((event.channel.index(), event.kind, topic.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            (0, TouchKind::Touched, "carol/feeds/picap-touched".to_owned()),
            (1, TouchKind::Released, "carol/feeds/picap-released".to_owned()),
        ]
    );
}

// ── Failure semantics ─────────────────────────────────────────

#[test]
fn sensor_error_ends_the_cycle() {
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([Step::BusError]);
    let err = bridge
        .poll_once(&mut sensor, &mut RecordingPublisher::new(), &mut RecordingSink::new())
        .unwrap_err();
    assert!(matches!(err, Error::Sensor(SensorError::Bus(_))));
    assert_eq!(sensor.refreshes, 0);
}

#[test]
fn publish_error_aborts_remaining_channels() {
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([Step::Mask(0b111)]);
    let mut out = RecordingPublisher::failing_at(1);

    let err = bridge
        .poll_once(&mut sensor, &mut out, &mut RecordingSink::new())
        .unwrap_err();

    assert!(matches!(err, Error::Publish(PublishError::Disconnected(_))));
    assert_eq!(out.sent.len(), 1, "nothing after the failed publish");
    assert_eq!(bridge.stats().published, 1);
}

#[test]
fn lost_broker_ends_idle_loop() {
    let cancel = CancelToken::new();
    let mut bridge = bridge_for(None);
    // No script: the pads stay untouched forever.
    let mut sensor = ScriptedSensor::new([]);
    let mut out = RecordingPublisher::losing_link_at(3);
    let mut sink = RecordingSink::new();

    let err = bridge
        .run(&mut sensor, &mut out, &mut sink, &cancel, Duration::ZERO)
        .unwrap_err();

    assert!(matches!(err, Error::Publish(PublishError::Disconnected(_))));
    assert!(out.sent.is_empty());
    assert_eq!(sensor.change_checks, 3, "the failing cycle never polls the sensor");
    assert_eq!(bridge.stats().cycles, 4);
    assert!(!sink.events.iter().any(|e| matches!(e, BridgeEvent::Stopped(_))));
}

// ── Loop and cancellation ─────────────────────────────────────

#[test]
fn run_drains_script_then_stops_on_cancel() {
    let cancel = CancelToken::new();
    let mut bridge = bridge_for(Some("alice"));
    let mut sensor = ScriptedSensor::new([
        Step::Unchanged,
        Step::Mask(0b1000),
        Step::Unchanged,
        Step::Mask(0),
    ])
    .cancelling(&cancel);
    let mut out = RecordingPublisher::new();
    let mut sink = RecordingSink::new();

    let stats = bridge
        .run(&mut sensor, &mut out, &mut sink, &cancel, Duration::ZERO)
        .unwrap();

    assert_eq!(stats.cycles, 4);
    assert_eq!(stats.changes, 2);
    assert_eq!(stats.published, 2);
    assert_eq!(
        out.topics(),
        vec!["alice/feeds/picap-touched", "alice/feeds/picap-released"]
    );
    assert!(matches!(sink.events.first(), Some(BridgeEvent::Started { .. })));
    assert!(matches!(sink.events.last(), Some(BridgeEvent::Stopped(s)) if *s == stats));
}

#[test]
fn run_propagates_runtime_fault() {
    let cancel = CancelToken::new();
    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([Step::Unchanged, Step::BusError, Step::Mask(1)]);
    let mut sink = RecordingSink::new();

    let result = bridge.run(
        &mut sensor,
        &mut RecordingPublisher::new(),
        &mut sink,
        &cancel,
        Duration::ZERO,
    );

    assert!(result.is_err());
    assert_eq!(sensor.change_checks, 2, "no poll after the fault");
    assert!(!sink.events.iter().any(|e| matches!(e, BridgeEvent::Stopped(_))));
}

#[test]
fn run_honours_cancel_from_another_thread() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        remote.cancel();
    });

    let mut bridge = bridge_for(None);
    let mut sensor = ScriptedSensor::new([]);
    let stats = bridge
        .run(
            &mut sensor,
            &mut RecordingPublisher::new(),
            &mut RecordingSink::new(),
            &cancel,
            Duration::from_millis(1),
        )
        .unwrap();
    handle.join().unwrap();

    assert!(stats.cycles >= 1);
    assert_eq!(stats.published, 0);
}
