//! Desktop simulator for the Climeter clock
//!
//! Runs the controller (engine and frame builder) and the matrix driver
//! (command replay) in one process, joined by an in-memory byte link that
//! carries the same frames as the UART. The chained panels are an SDL2
//! window via `embedded-graphics-simulator`. Wall time comes from the host
//! through `TimeSync`, as a real driver would send it.
//!
//! # Key bindings
//!
//! | Key    | Action                        |
//! |--------|-------------------------------|
//! | Space  | Toggle button (held = pressed)|
//! | Q, Esc | Quit                          |

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    sdl2::Keycode, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use log::{debug, error, info, warn};

use climeter_core::config::{parse_config, ClockConfig};
use climeter_core::input::{EdgeDetector, EdgeLatch};
use climeter_core::traits::{OffsetClock, SyncedClock, WallClock};
use climeter_core::ClockEngine;
use climeter_display::{present, FrameBuilder};
use climeter_hal::Level;
use climeter_protocol::{MatrixCommand, MatrixEvent};

mod link;

use link::{ControllerLink, Driver};

/// Same file the firmware embeds
const CONFIG: &str = include_str!("../../../climeter-firmware/clock.toml");

/// Screen pixels per LED
const WINDOW_SCALE: u32 = 6;

/// How often the driver resends wall time
const TIME_SYNC_INTERVAL: Duration = Duration::from_secs(60);

fn load_config() -> Option<ClockConfig> {
    match parse_config(CONFIG) {
        Ok(config) => Some(config),
        Err(e) => {
            error!("Failed to parse clock.toml at line {}: {:?}", e.line, e.kind);
            None
        }
    }
}

fn unix_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn main() {
    env_logger::init();
    info!("Starting Climeter simulator");

    let Some(config) = load_config() else {
        std::process::exit(1);
    };
    let mut engine = match ClockEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid deadline configuration: {:?}", e);
            std::process::exit(1);
        }
    };
    if let Some(at) = engine.deadline() {
        info!("Deadline: {} s since epoch", at.timestamp());
    }

    let builder = FrameBuilder::from_config(&config);
    let width = u32::from(config.matrix.width());
    let height = u32::from(config.matrix.height());
    info!(
        "Panels: {}x{} ({} chained), layout {} px wide",
        width,
        height,
        config.matrix.chain_length.panels(),
        builder.layout().width
    );
    info!("Keys: Space=toggle  Q=Quit");

    let refresh = Duration::from_millis(config.display.refresh_ms.into());

    let start = Instant::now();
    let uptime_ms = || start.elapsed().as_millis() as u64;
    let offset = OffsetClock::new();
    let clock = SyncedClock::new(&offset, uptime_ms);

    let toggle = config.input.toggle_pin;
    let mut detector = EdgeDetector::new(toggle.pin, Level::Low);
    let latch = EdgeLatch::new();

    let mut controller = ControllerLink::new();
    let mut driver = Driver::new(SimulatorDisplay::<Rgb888>::new(Size::new(width, height)));

    let output_settings = OutputSettingsBuilder::new()
        .scale(WINDOW_SCALE)
        .pixel_spacing(1)
        .build();
    let mut window = Window::new("Climeter", &output_settings);

    // The SDL window is created on the first `update()`; `events()` panics before that
    window.update(driver.display());

    if let Err(e) = controller.send(MatrixCommand::Brightness(config.matrix.brightness)) {
        warn!("Failed to queue brightness: {:?}", e);
    }

    let mut last_sync: Option<Instant> = None;

    'running: loop {
        let tick_start = Instant::now();

        for event in window.events() {
            let level = match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. }
                    if keycode == Keycode::Q || keycode == Keycode::Escape =>
                {
                    break 'running
                }
                SimulatorEvent::KeyDown { keycode, repeat, .. }
                    if keycode == Keycode::Space && !repeat =>
                {
                    Level::High
                }
                SimulatorEvent::KeyUp { keycode, .. } if keycode == Keycode::Space => Level::Low,
                _ => continue,
            };
            if let Some(edge) = detector.sample(level, uptime_ms()) {
                debug!("Edge: {:?}", edge);
                if let Some(dropped) = latch.post(edge) {
                    debug!("Dropped edge at {} ms", dropped.at_ms);
                }
            }
        }

        // Driver side
        if last_sync.map_or(true, |at| at.elapsed() >= TIME_SYNC_INTERVAL) {
            driver.send(MatrixEvent::TimeSync {
                unix_ms: unix_now_ms(),
            });
            last_sync = Some(Instant::now());
        }
        if let Some(seq) = controller.receive(driver.take_tx(), &offset, uptime_ms()) {
            if seq != controller.seq() {
                debug!("Late confirmation for frame {}", seq);
            }
        }

        // Controller side
        let event = latch.take();
        let frame = match clock.now() {
            Some(now) => {
                let snapshot = engine.tick(now, event);
                if snapshot.mode_changed {
                    info!("Display mode: {:?}", snapshot.mode);
                }
                builder.build(&snapshot)
            }
            None => builder.build_syncing(),
        };
        match frame {
            Ok(frame) => {
                if let Err(e) = present(&frame, &mut controller) {
                    warn!("Failed to queue frame: {:?}", e);
                }
            }
            Err(e) => warn!("Failed to build frame: {:?}", e),
        }

        driver.receive(controller.take_tx());
        window.update(driver.display());

        let elapsed = tick_start.elapsed();
        if elapsed < refresh {
            std::thread::sleep(refresh - elapsed);
        }
    }

    info!("Simulator exiting after {} frames", driver.presented());
}
