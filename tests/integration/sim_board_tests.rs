//! End-to-end classification of the simulated demo bench.

use pinprobe::adapters::sim::{SimulatedBoard, Wiring};
use pinprobe::app::service::DetectionService;
use pinprobe::classifier::{AnalogClass, SignalClass};
use pinprobe::config::DetectorConfig;
use pinprobe::registry::{Detection, DeviceKey};

use crate::mock_hw::{CollectSink, MockDelay};

fn digital_class(svc: &DetectionService, pin: u8) -> Option<SignalClass> {
    match svc.registry().get(&DeviceKey::Gpio(pin))?.detection {
        Detection::Digital(r) => Some(r.class),
        _ => None,
    }
}

fn analog_class(svc: &DetectionService, ch: u8) -> Option<AnalogClass> {
    match svc.registry().get(&DeviceKey::Analog(ch))?.detection {
        Detection::Analog(r) => Some(r.class),
        _ => None,
    }
}

#[test]
fn demo_bench_classifies_every_part() {
    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut board = SimulatedBoard::demo();
    let mut sink = CollectSink::new();
    let mut delay = MockDelay::default();

    let s = svc.scan_gpio(&mut board, &mut delay, &mut sink);
    assert_eq!(s.detected, 6);

    assert_eq!(digital_class(&svc, 4), Some(SignalClass::CommunicationLike));
    assert_eq!(digital_class(&svc, 17), Some(SignalClass::Button));
    assert_eq!(digital_class(&svc, 22), Some(SignalClass::DrivenLow));
    assert_eq!(digital_class(&svc, 23), Some(SignalClass::PwmSignal));
    assert_eq!(digital_class(&svc, 24), Some(SignalClass::MotionLike));
    assert_eq!(digital_class(&svc, 27), Some(SignalClass::DigitalSensorActiveHigh));

    svc.scan_analog(&mut board, &mut delay, &mut sink);
    assert_eq!(analog_class(&svc, 0), Some(AnalogClass::Potentiometer));
    assert_eq!(analog_class(&svc, 1), Some(AnalogClass::Joystick));
    assert_eq!(analog_class(&svc, 2), Some(AnalogClass::Photoresistor));
    assert_eq!(analog_class(&svc, 3), None);

    svc.scan_i2c(&mut board, &mut sink);
    svc.scan_onewire(&mut board, &mut sink);
    svc.scan_spi(&mut board, &mut sink);
    assert_eq!(svc.registry().len(), 6 + 3 + 2 + 1 + 1);
}

#[test]
fn second_pass_is_quiet() {
    let svc = DetectionService::standalone(DetectorConfig::default());
    let mut board = SimulatedBoard::demo();
    let mut delay = MockDelay::default();

    svc.scan_gpio(&mut board, &mut delay, &mut CollectSink::new());
    let mut sink = CollectSink::new();
    svc.scan_gpio(&mut board, &mut delay, &mut sink);
    // Only the pass summary: same classes, inside the re-detection window.
    assert_eq!(sink.events.len(), 1);
}

#[test]
fn faulty_pin_does_not_stop_the_pass() {
    let mut config = DetectorConfig::default();
    config.gpio_pins.clear();
    for p in [5, 6] {
        config.gpio_pins.push(p).unwrap();
    }
    let svc = DetectionService::standalone(config);
    let mut board = SimulatedBoard::new()
        .with_pin(5, Wiring::Faulty)
        .with_pin(6, Wiring::Open { floating: false });

    let s = svc.scan_gpio(&mut board, &mut MockDelay::default(), &mut CollectSink::new());
    assert_eq!((s.probed, s.detected, s.skipped), (1, 1, 1));
    assert_eq!(board.pull_of(5), None);
    assert_eq!(board.pull_of(6), None);
}
