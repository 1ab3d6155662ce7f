//! End-to-end: simulated MPR121 bus → driver → TouchBridge → publisher.

use crate::mock_hw::{RecordingPublisher, RecordingSink};

use embedded_hal::i2c::ErrorKind;
use picap_mqtt::app::service::TouchBridge;
use picap_mqtt::app::topics::FeedTopics;
use picap_mqtt::error::{Error, SensorError};
use picap_mqtt::sensors::sim::{NoDelay, SimBus};
use picap_mqtt::sensors::{Mpr121, PICAP_ADDRESS};

fn picap() -> Mpr121<SimBus> {
    let mut dev = Mpr121::new(SimBus::new(PICAP_ADDRESS), PICAP_ADDRESS);
    dev.begin(&mut NoDelay).expect("simulated MPR121 comes up");
    dev
}

/// Set the electrode state, then run one bridge cycle.
fn cycle(
    dev: &mut Mpr121<SimBus>,
    mask: u16,
    bridge: &mut TouchBridge,
    out: &mut RecordingPublisher,
) -> usize {
    dev.bus_mut().set_touch_mask(mask);
    bridge
        .poll_once(dev, out, &mut RecordingSink::new())
        .unwrap()
}

#[test]
fn first_touch_after_begin_is_published() {
    let mut dev = picap();
    let mut bridge = TouchBridge::new(FeedTopics::new(Some("alice")));
    let mut out = RecordingPublisher::new();

    let n = cycle(&mut dev, 1 << 3, &mut bridge, &mut out);

    assert_eq!(n, 1);
    assert_eq!(
        out.sent,
        vec![("alice/feeds/picap-touched".to_owned(), "3".to_owned())]
    );
}

#[test]
fn touch_hold_release_sequence() {
    let mut dev = picap();
    let mut bridge = TouchBridge::new(FeedTopics::new(None));
    let mut out = RecordingPublisher::new();

    cycle(&mut dev, 0b0000_1000_0000, &mut bridge, &mut out);
    cycle(&mut dev, 0b0000_1000_0000, &mut bridge, &mut out);
    cycle(&mut dev, 0b0000_1000_0001, &mut bridge, &mut out);
    cycle(&mut dev, 0b0000_0000_0001, &mut bridge, &mut out);

    let got: Vec<(&str, &str)> = out
        .sent
        .iter()
        .map(|(t, p)| (t.as_str(), p.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("/feeds/picap-touched", "7"),
            ("/feeds/picap-touched", "0"),
            ("/feeds/picap-released", "7"),
        ]
    );
    assert_eq!(bridge.stats().cycles, 4);
    assert_eq!(bridge.stats().changes, 3);
}

#[test]
fn idle_device_publishes_nothing() {
    let mut dev = picap();
    let mut bridge = TouchBridge::new(FeedTopics::new(None));
    let mut out = RecordingPublisher::new();

    for _ in 0..5 {
        assert_eq!(cycle(&mut dev, 0, &mut bridge, &mut out), 0);
    }
    assert_eq!(bridge.stats().cycles, 5);
    assert_eq!(bridge.stats().changes, 0);
    assert!(out.sent.is_empty());
}

#[test]
fn over_current_flag_does_not_count_as_a_change() {
    let mut dev = picap();
    let mut bridge = TouchBridge::new(FeedTopics::new(None));
    dev.bus_mut().set_status_word(0x8000);

    let n = bridge
        .poll_once(&mut dev, &mut RecordingPublisher::new(), &mut RecordingSink::new())
        .unwrap();
    assert_eq!(n, 0);
    assert_eq!(bridge.stats().changes, 0);
}

#[test]
fn missing_device_fails_begin() {
    let mut dev = Mpr121::new(SimBus::new(0x5A), PICAP_ADDRESS);
    let err = dev.begin(&mut NoDelay).unwrap_err();
    assert!(matches!(err, SensorError::Bus(ErrorKind::NoAcknowledge(_))));
}

#[test]
fn bus_fault_mid_run_is_fatal() {
    let mut dev = picap();
    dev.bus_mut().fail_next(ErrorKind::ArbitrationLoss);
    let mut bridge = TouchBridge::new(FeedTopics::new(None));

    let err = bridge
        .poll_once(&mut dev, &mut RecordingPublisher::new(), &mut RecordingSink::new())
        .unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Bus(ErrorKind::ArbitrationLoss)));
}
