//! DetectionService passes against mock and simulated adapters.

use std::time::{Duration, Instant};

use pinprobe::adapters::sim::SimulatedBoard;
use pinprobe::app::events::{DetectionEvent, Source};
use pinprobe::app::service::DetectionService;
use pinprobe::bus::{BootConfigSpi, SysfsOneWire};
use pinprobe::classifier::{AnalogClass, SignalClass};
use pinprobe::config::DetectorConfig;
use pinprobe::registry::{Detection, DeviceKey};

use crate::mock_hw::{CollectSink, MockAdc, MockDelay, MockPins, Script};

fn config_with_pins(pins: &[u8]) -> DetectorConfig {
    let mut c = DetectorConfig::default();
    c.gpio_pins.clear();
    for &p in pins {
        c.gpio_pins.push(p).unwrap();
    }
    c
}

fn last_summary(sink: &CollectSink) -> pinprobe::app::events::PassSummary {
    match sink.events.last() {
        Some(DetectionEvent::PassCompleted(s)) => *s,
        other => panic!("expected a pass summary, got {:?}", other),
    }
}

#[test]
fn gpio_pass_records_matches_and_skips_faults() {
    let svc = DetectionService::standalone(config_with_pins(&[5, 6, 13, 17]));
    let mut pins = MockPins::new()
        .with(5, Script::new([true, false, false], "1111111111"))
        .with(6, Script::new([true, true, true], "1111111111").failing_at(4))
        // t = 3, aperiodic: unknown, examined but not recorded
        .with(13, Script::new([true, true, true], "1101111000"))
        .with(17, Script::new([false, false, false], "0000000000"));
    let mut sink = CollectSink::new();

    let s = svc.scan_gpio(&mut pins, &mut MockDelay::default(), &mut sink);
    assert_eq!(s.source, Source::Gpio);
    // GPIO6 faults mid-window: skipped, not probed.
    assert_eq!((s.probed, s.detected, s.skipped), (3, 2, 1));
    assert_eq!(s.probed + s.skipped, 4);
    assert_eq!(sink.detected_keys(), vec![DeviceKey::Gpio(5), DeviceKey::Gpio(17)]);
    assert_eq!(last_summary(&sink), s);

    let rec = svc.registry().get(&DeviceKey::Gpio(17)).unwrap();
    match rec.detection {
        Detection::Digital(r) => assert_eq!(r.class, SignalClass::DrivenLow),
        other => panic!("unexpected {:?}", other),
    }
    assert!(svc.registry().get(&DeviceKey::Gpio(13)).is_none());
    // Every probed pin was handed back.
    for pin in [5, 6, 13, 17] {
        assert!(pins.released(pin), "GPIO{} not released", pin);
    }
}

#[test]
fn changed_class_is_reported_as_change() {
    let svc = DetectionService::standalone(config_with_pins(&[5]));
    let mut sink = CollectSink::new();

    let mut first = MockPins::new().with(5, Script::new([true, false, false], "1111111111"));
    svc.scan_gpio(&mut first, &mut MockDelay::default(), &mut sink);

    let mut second = MockPins::new().with(5, Script::new([true, true, true], "1010101010"));
    sink.events.clear();
    svc.scan_gpio(&mut second, &mut MockDelay::default(), &mut sink);

    assert!(matches!(
        &sink.events[0],
        DetectionEvent::Changed {
            key: DeviceKey::Gpio(5),
            previous: "button",
            ..
        }
    ));
}

#[test]
fn leased_pin_is_skipped() {
    let svc = DetectionService::standalone(config_with_pins(&[5, 6]));
    let mut pins = MockPins::new()
        .with(5, Script::new([true, false, false], "1111111111"))
        .with(6, Script::new([true, false, false], "1111111111"));
    let mut sink = CollectSink::new();

    let lease = svc.locks().try_acquire(5).unwrap();
    let s = svc.scan_gpio(&mut pins, &mut MockDelay::default(), &mut sink);
    drop(lease);

    assert_eq!((s.probed, s.detected, s.skipped), (1, 1, 1));
    assert!(pins.calls_for(5).is_empty(), "leased pin must not be touched");
}

#[test]
fn analog_pass_classifies_and_drops_unconnected() {
    let mut c = DetectorConfig::default();
    c.analog_channels.clear();
    for ch in [0, 1, 2] {
        c.analog_channels.push(ch).unwrap();
    }
    let svc = DetectionService::standalone(c);
    let mut adc = MockAdc::default()
        .with(0, &[0.36, 0.64])
        .with(1, &[0.004]);
    let mut sink = CollectSink::new();

    let s = svc.scan_analog(&mut adc, &mut MockDelay::default(), &mut sink);
    // ch2 is not scripted and fails.
    assert_eq!((s.probed, s.detected, s.skipped), (2, 1, 1));
    match svc.registry().get(&DeviceKey::Analog(0)).unwrap().detection {
        Detection::Analog(r) => assert_eq!(r.class, AnalogClass::Joystick),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn i2c_sweep_identifies_devices() {
    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut bus = SimulatedBoard::new().with_i2c(&[0x3c, 0x50]);
    let mut sink = CollectSink::new();

    let s = svc.scan_i2c(&mut bus, &mut sink);
    assert_eq!(s.probed, 0x77 - 0x03 + 1);
    assert_eq!(s.detected, 2);
    match svc.registry().get(&DeviceKey::I2c(0x3c)).unwrap().detection {
        Detection::I2c(dev) => assert_eq!(dev.part, Some("SSD1306")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn onewire_and_spi_from_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let w1 = dir.path().join("w1");
    std::fs::create_dir_all(w1.join("28-00000a1b2c3d")).unwrap();
    std::fs::create_dir_all(w1.join("w1_bus_master1")).unwrap();
    let boot = dir.path().join("config.txt");
    std::fs::write(&boot, "# dtparam=spi=on\ndtparam=spi=on\n").unwrap();

    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut sink = CollectSink::new();
    svc.scan_onewire(&mut SysfsOneWire::new(&w1), &mut sink);
    svc.scan_spi(&mut BootConfigSpi::new(&boot), &mut sink);

    assert_eq!(
        sink.detected_keys(),
        vec![DeviceKey::OneWire("28-00000a1b2c3d".into()), DeviceKey::Spi(0)]
    );
}

#[test]
fn missing_onewire_directory_detects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut sink = CollectSink::new();
    let s = svc.scan_onewire(&mut SysfsOneWire::new(dir.path().join("none")), &mut sink);
    assert_eq!(s.detected, 0);
    assert!(sink.detected_keys().is_empty());
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, DetectionEvent::Unavailable { .. })));
}

#[test]
fn expire_stale_emits_lost_for_old_entries_only() {
    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut sink = CollectSink::new();
    svc.scan_spi(&mut SimulatedBoard::new().with_spi(true), &mut sink);

    sink.events.clear();
    assert!(svc.expire_stale(Instant::now(), &mut sink).is_empty());
    assert!(sink.lost_keys().is_empty());

    let later = Instant::now() + Duration::from_secs(301);
    assert_eq!(svc.expire_stale(later, &mut sink), vec![DeviceKey::Spi(0)]);
    assert_eq!(sink.lost_keys(), vec![DeviceKey::Spi(0)]);
    assert!(svc.registry().is_empty());
}

#[test]
fn report_includes_suggestions() {
    let svc = DetectionService::standalone(config_with_pins(&[5]));
    let mut pins = MockPins::new().with(5, Script::new([true, false, false], "1111111111"));
    svc.scan_gpio(&mut pins, &mut MockDelay::default(), &mut CollectSink::new());

    let report = svc.report(Instant::now());
    assert_eq!(report.len(), 1);
    assert!(report[0].suggestions.contains(&"push button"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json[0]["key"]["source"], "gpio");
    assert_eq!(json[0]["detection"]["class"], "button");
}
