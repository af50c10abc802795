//! Cross-thread behaviour: pin exclusion, shared registry, polling loops.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pinprobe::adapters::sim::SimulatedBoard;
use pinprobe::app::service::DetectionService;
use pinprobe::config::DetectorConfig;
use pinprobe::registry::{DeviceKey, DeviceRegistry, PinLocks};
use pinprobe::workers::{StopToken, Workers};

use crate::mock_hw::{CollectSink, MockDelay, MockPins, Script};

#[test]
fn pin_leased_by_another_thread_is_skipped() {
    let locks = Arc::new(PinLocks::new());
    let registry = Arc::new(DeviceRegistry::new());
    let mut config = DetectorConfig::default();
    config.gpio_pins.clear();
    config.gpio_pins.push(17).unwrap();
    let svc = DetectionService::new(config, Arc::clone(&registry), Arc::clone(&locks));

    let held = Arc::new(Barrier::new(2));
    let done = Arc::new(Barrier::new(2));
    let holder = {
        let (locks, held, done) = (Arc::clone(&locks), Arc::clone(&held), Arc::clone(&done));
        thread::spawn(move || {
            let _lease = locks.try_acquire(17).unwrap();
            held.wait();
            done.wait();
        })
    };

    held.wait();
    let mut pins = MockPins::new().with(17, Script::new([true, false, false], "1111111111"));
    let s = svc.scan_gpio(&mut pins, &mut MockDelay::default(), &mut CollectSink::new());
    done.wait();
    holder.join().unwrap();

    assert_eq!((s.probed, s.skipped), (0, 1));
    assert!(pins.calls.is_empty());
    assert!(registry.is_empty());
    assert!(!locks.is_leased(17));
}

#[test]
fn parallel_scans_share_one_registry() {
    let board = SimulatedBoard::demo();
    let svc = DetectionService::standalone(DetectorConfig::default());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = svc.clone();
            let mut b = board.clone();
            thread::spawn(move || {
                let mut sink = CollectSink::new();
                svc.scan_gpio(&mut b, &mut MockDelay::default(), &mut sink);
                svc.scan_i2c(&mut b, &mut sink);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Leased pins were skipped by some threads; the table still holds one
    // entry per device.
    assert!(svc.registry().get(&DeviceKey::Gpio(17)).is_some());
    assert!(svc.registry().get(&DeviceKey::I2c(0x27)).is_some());
    assert_eq!(
        svc.registry()
            .snapshot()
            .iter()
            .filter(|(k, _)| matches!(k, DeviceKey::I2c(_)))
            .count(),
        2
    );
}

#[test]
fn workers_populate_registry_and_stop_promptly() {
    let svc = DetectionService::standalone(DetectorConfig::default());
    let token = StopToken::new();
    let mut workers = Workers::new(token.clone());

    let (worker_svc, mut board) = (svc.clone(), SimulatedBoard::demo());
    workers
        .spawn("test-bus", Duration::from_secs(60), move || {
            let mut sink = CollectSink::new();
            worker_svc.scan_spi(&mut board, &mut sink);
            worker_svc.scan_onewire(&mut board, &mut sink);
        })
        .unwrap();

    for _ in 0..100 {
        if svc.registry().len() == 2 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(svc.registry().len(), 2);

    // The loop is sleeping out a 60 s interval; shutdown must not wait for it.
    let t0 = std::time::Instant::now();
    workers.shutdown();
    assert!(t0.elapsed() < Duration::from_secs(5));
    assert!(token.is_stopped());
}
