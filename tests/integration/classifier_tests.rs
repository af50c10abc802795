//! Probe sequencing and failure handling of the digital classifier.

use pinprobe::app::ports::Pull;
use pinprobe::classifier::{PinSignalClassifier, SignalClass, classify_observation};
use pinprobe::config::DetectorConfig;

use crate::mock_hw::{MockDelay, MockPins, PinCall, Script};

const OPEN: [bool; 3] = [true, false, false];
const HELD_HIGH: [bool; 3] = [true, true, true];

fn classifier(settle_ms: u32, interval_ms: u32) -> PinSignalClassifier {
    PinSignalClassifier::new(&DetectorConfig {
        settle_ms,
        sample_interval_ms: interval_ms,
        ..DetectorConfig::default()
    })
}

#[test]
fn probe_sequence_is_up_down_floating_then_window() {
    let mut pins = MockPins::new().with(17, Script::new(OPEN, "1111111111"));
    let mut delay = MockDelay::default();

    let r = classifier(7, 3).classify_digital(&mut pins, &mut delay, 17).unwrap();
    assert_eq!(r.class, SignalClass::Button);

    let mut expected = vec![
        PinCall::Configure(17, Pull::Up),
        PinCall::Read(17),
        PinCall::Configure(17, Pull::Down),
        PinCall::Read(17),
        PinCall::Configure(17, Pull::Floating),
        PinCall::Read(17),
        PinCall::Configure(17, Pull::Up),
    ];
    expected.extend(std::iter::repeat_n(PinCall::Read(17), 10));
    expected.push(PinCall::Release(17));
    assert_eq!(pins.calls, expected);

    // Settle after each of the four reconfigurations, then N-1 gaps.
    let mut delays = vec![7, 7, 7, 7];
    delays.extend(std::iter::repeat_n(3, 9));
    assert_eq!(delay.ms, delays);
}

#[test]
fn failure_mid_window_yields_none_and_releases_pin() {
    let mut pins = MockPins::new().with(5, Script::new(OPEN, "1111111111").failing_at(6));
    let mut delay = MockDelay::default();

    assert!(classifier(10, 10).classify_digital(&mut pins, &mut delay, 5).is_none());
    assert!(pins.released(5));
}

#[test]
fn failure_on_configure_yields_none() {
    let mut pins = MockPins::new();
    let mut delay = MockDelay::default();
    assert!(classifier(10, 10).classify_digital(&mut pins, &mut delay, 9).is_none());
    assert!(pins.released(9));
}

#[test]
fn observed_window_matches_script() {
    let mut pins = MockPins::new().with(23, Script::new(HELD_HIGH, "1100110011"));
    let mut delay = MockDelay::default();

    let obs = classifier(10, 10).observe(&mut pins, &mut delay, 23).unwrap();
    assert_eq!(obs.window_pull, Pull::Up);
    assert_eq!(obs.samples.len(), 10);
    assert!(obs.probe.up && obs.probe.down && obs.probe.floating);

    let r = classify_observation(&obs);
    assert_eq!(r.class, SignalClass::PwmSignal);
    assert_eq!(r.characteristics.period, Some(4));
}

#[test]
fn classifying_the_same_observation_twice_is_identical() {
    let mut pins = MockPins::new().with(24, Script::new(HELD_HIGH, "0011100000"));
    let mut delay = MockDelay::default();
    let obs = classifier(10, 10).observe(&mut pins, &mut delay, 24).unwrap();

    let a = classify_observation(&obs);
    let b = classify_observation(&obs);
    assert_eq!(a, b);
    assert_eq!(a.class, SignalClass::MotionLike);
}

#[test]
fn larger_windows_are_sampled_in_full() {
    let c = PinSignalClassifier::new(&DetectorConfig {
        sample_count: 20,
        ..DetectorConfig::default()
    });
    let mut pins = MockPins::new().with(6, Script::new(HELD_HIGH, "10"));
    let mut delay = MockDelay::default();
    let obs = c.observe(&mut pins, &mut delay, 6).unwrap();
    assert_eq!(obs.samples.len(), 20);
    assert_eq!(classify_observation(&obs).class, SignalClass::CommunicationLike);
}
