//! pinprobe: Raspberry Pi component auto-detection.
//!
//! Hexagonal layout: one polling thread per subsystem, each owning its
//! hardware adapter and a clone of the detection service.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RpiPins / SimulatedBoard   Mcp3008   I2c   SysfsOneWire       │
//! │  (PinProbePort)       (AnalogPort) (e-hal)  BootConfigSpi      │
//! │  LogEventSink (EventSink)   JsonConfigFile (ConfigPort)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        DetectionService (classify · record · age)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Workers: gpio-scan · analog-scan · i2c-scan · bus-scan        │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_hal::i2c::I2c;
use log::info;

use pinprobe::adapters::config_file::load_config;
use pinprobe::adapters::log_sink::LogEventSink;
use pinprobe::adapters::sim::SimulatedBoard;
use pinprobe::app::ports::{AnalogPort, OneWirePort, PinProbePort, SpiProbePort};
use pinprobe::app::service::DetectionService;
use pinprobe::drivers::delay::StdDelay;
use pinprobe::registry::{DeviceRegistry, PinLocks};
use pinprobe::workers::{StopToken, Workers};

/// Detect components wired to the Raspberry Pi header.
#[derive(Parser, Debug)]
#[command(name = "pinprobe", version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults apply when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run every pass once and print a JSON report on stdout
    #[arg(long)]
    once: bool,

    /// Stop continuous polling after this many seconds
    #[arg(long)]
    run_secs: Option<u64>,

    /// Use the simulated board even when real hardware is available
    #[arg(long)]
    sim: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Everything one detection run needs, one handle per subsystem.
struct Hardware<P, A, I, W, S> {
    pins: P,
    adc: Option<A>,
    i2c: Option<I>,
    onewire: W,
    spi: S,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("pinprobe v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("loading {}", path.display()),
        None => "default configuration".to_owned(),
    })?;

    #[cfg(all(feature = "rpi", target_os = "linux"))]
    let hw_config = config.clone();
    let service = DetectionService::new(
        config,
        Arc::new(DeviceRegistry::new()),
        Arc::new(PinLocks::new()),
    );

    #[cfg(all(feature = "rpi", target_os = "linux"))]
    if !args.sim {
        return run(&args, service, rpi_hardware(&hw_config)?);
    }

    info!("Using the simulated board");
    let board = SimulatedBoard::demo();
    let hw = Hardware {
        pins: board.clone(),
        adc: Some(board.clone()),
        i2c: Some(board.clone()),
        onewire: board.clone(),
        spi: board,
    };
    run(&args, service, hw)
}

#[cfg(all(feature = "rpi", target_os = "linux"))]
fn rpi_hardware(
    config: &pinprobe::config::DetectorConfig,
) -> Result<
    Hardware<
        pinprobe::adapters::rpi::RpiPins,
        pinprobe::drivers::mcp3008::Mcp3008<rppal::spi::SimpleHalSpiDevice>,
        rppal::i2c::I2c,
        pinprobe::bus::SysfsOneWire,
        pinprobe::bus::BootConfigSpi,
    >,
> {
    use pinprobe::adapters::rpi;

    let pins = rpi::RpiPins::open()
        .map_err(pinprobe::Error::from)
        .context("opening GPIO")?;
    let adc = rpi::open_mcp3008()
        .inspect_err(|e| log::warn!("MCP3008 unavailable ({}), analog scan disabled", e))
        .ok();
    let i2c = rpi::open_i2c(config.i2c_bus)
        .inspect_err(|e| log::warn!("I2C bus {} unavailable ({}), sweep disabled", config.i2c_bus, e))
        .ok();
    Ok(Hardware {
        pins,
        adc,
        i2c,
        onewire: pinprobe::bus::SysfsOneWire::new(&config.onewire_dir),
        spi: pinprobe::bus::BootConfigSpi::new(&config.boot_config_path),
    })
}

fn run<P, A, I, W, S>(args: &Args, service: DetectionService, hw: Hardware<P, A, I, W, S>) -> Result<()>
where
    P: PinProbePort + Send + 'static,
    A: AnalogPort + Send + 'static,
    I: I2c + Send + 'static,
    W: OneWirePort + Send + 'static,
    S: SpiProbePort + Send + 'static,
{
    if args.once {
        run_once(&service, hw)
    } else {
        run_continuous(&service, hw, args.run_secs.map(Duration::from_secs))
    }
}

/// One pass per subsystem, then the device table as JSON on stdout.
fn run_once<P, A, I, W, S>(service: &DetectionService, mut hw: Hardware<P, A, I, W, S>) -> Result<()>
where
    P: PinProbePort,
    A: AnalogPort,
    I: I2c,
    W: OneWirePort,
    S: SpiProbePort,
{
    let mut sink = LogEventSink::new();
    let mut delay = StdDelay;

    service.start(&mut sink);
    service.scan_gpio(&mut hw.pins, &mut delay, &mut sink);
    if let Some(adc) = hw.adc.as_mut() {
        service.scan_analog(adc, &mut delay, &mut sink);
    }
    if let Some(i2c) = hw.i2c.as_mut() {
        service.scan_i2c(i2c, &mut sink);
    }
    service.scan_onewire(&mut hw.onewire, &mut sink);
    service.scan_spi(&mut hw.spi, &mut sink);

    let report = service.report(Instant::now());
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &report).context("writing report")?;
    println!();
    Ok(())
}

/// Poll every subsystem on its own thread until stopped.
fn run_continuous<P, A, I, W, S>(
    service: &DetectionService,
    hw: Hardware<P, A, I, W, S>,
    run_for: Option<Duration>,
) -> Result<()>
where
    P: PinProbePort + Send + 'static,
    A: AnalogPort + Send + 'static,
    I: I2c + Send + 'static,
    W: OneWirePort + Send + 'static,
    S: SpiProbePort + Send + 'static,
{
    let config = service.config().clone();
    let token = StopToken::new();
    let mut workers = Workers::new(token.clone());
    service.start(&mut LogEventSink::new());

    // ── GPIO + stale sweep ────────────────────────────────────
    {
        let svc = service.clone();
        let mut pins = hw.pins;
        let mut sink = LogEventSink::new();
        workers
            .spawn(
                "gpio-scan",
                Duration::from_millis(u64::from(config.gpio_scan_interval_ms)),
                move || {
                    svc.scan_gpio(&mut pins, &mut StdDelay, &mut sink);
                    svc.expire_stale(Instant::now(), &mut sink);
                },
            )
            .context("spawning gpio-scan")?;
    }

    // ── Analog ────────────────────────────────────────────────
    if let Some(mut adc) = hw.adc {
        let svc = service.clone();
        let mut sink = LogEventSink::new();
        workers
            .spawn(
                "analog-scan",
                Duration::from_millis(u64::from(config.analog_scan_interval_ms)),
                move || {
                    svc.scan_analog(&mut adc, &mut StdDelay, &mut sink);
                },
            )
            .context("spawning analog-scan")?;
    }

    // ── I²C ───────────────────────────────────────────────────
    if let Some(mut i2c) = hw.i2c {
        let svc = service.clone();
        let mut sink = LogEventSink::new();
        workers
            .spawn(
                "i2c-scan",
                Duration::from_secs(u64::from(config.i2c_scan_interval_secs)),
                move || {
                    svc.scan_i2c(&mut i2c, &mut sink);
                },
            )
            .context("spawning i2c-scan")?;
    }

    // ── 1-Wire + SPI ──────────────────────────────────────────
    {
        let svc = service.clone();
        let (mut onewire, mut spi) = (hw.onewire, hw.spi);
        let mut sink = LogEventSink::new();
        workers
            .spawn(
                "bus-scan",
                Duration::from_secs(u64::from(config.onewire_scan_interval_secs)),
                move || {
                    svc.scan_onewire(&mut onewire, &mut sink);
                    svc.scan_spi(&mut spi, &mut sink);
                },
            )
            .context("spawning bus-scan")?;
    }

    info!("{} polling loops running", workers.len());
    match run_for {
        Some(limit) => {
            token.wait_timeout(limit);
        }
        None => while !token.wait_timeout(Duration::from_secs(3600)) {},
    }

    info!("Stopping ({} devices known)", service.registry().len());
    workers.shutdown();
    Ok(())
}
