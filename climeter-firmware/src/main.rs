//! Climeter - Climate Deadline Clock Firmware
//!
//! Controller firmware for RP2040 boards. Runs the countdown engine and
//! sends finished frames to a matrix driver over UART; the driver owns the
//! LED panels and supplies wall-clock time.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use climeter_core::config::{parse_config, ClockConfig, DeadlineSource};
use climeter_core::input::EdgeDetector;
use climeter_core::ClockEngine;
use climeter_display::FrameBuilder;
use climeter_hal::{InputPin, Inverted};
use climeter_protocol::MatrixCommand;

mod board;
mod channels;
mod link;
mod tasks;

use board::{ButtonInput, FreePins};

/// Embedded configuration (compiled into firmware)
/// Edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

/// Matrix link baud rate
const LINK_BAUD: u32 = 921_600;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Climeter firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    let engine = match ClockEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid deadline configuration: {:?}", e);
            panic!("invalid deadline configuration");
        }
    };
    match (&config.deadline.source, engine.deadline()) {
        (_, Some(at)) => info!("Deadline: {} s since epoch", at.timestamp()),
        (DeadlineSource::Metric(name), None) => {
            warn!("Metric '{}' never reaches zero, countdown disabled", name.as_str())
        }
        (DeadlineSource::At(_), None) => {}
    }

    let builder = FrameBuilder::from_config(&config);
    info!(
        "Layout: {} panels, {} px wide",
        config.matrix.chain_length.panels(),
        builder.layout().width
    );

    // Matrix link on UART0 (GPIO0 TX, GPIO1 RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = LINK_BAUD;

    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for matrix link");

    let mut pins = FreePins::new([
        None,
        None,
        Some(p.PIN_2.into()),
        Some(p.PIN_3.into()),
        Some(p.PIN_4.into()),
        Some(p.PIN_5.into()),
        Some(p.PIN_6.into()),
        Some(p.PIN_7.into()),
        Some(p.PIN_8.into()),
        Some(p.PIN_9.into()),
        Some(p.PIN_10.into()),
        Some(p.PIN_11.into()),
        Some(p.PIN_12.into()),
        Some(p.PIN_13.into()),
        Some(p.PIN_14.into()),
        Some(p.PIN_15.into()),
        Some(p.PIN_16.into()),
        Some(p.PIN_17.into()),
        Some(p.PIN_18.into()),
        Some(p.PIN_19.into()),
        Some(p.PIN_20.into()),
        Some(p.PIN_21.into()),
        Some(p.PIN_22.into()),
        Some(p.PIN_23.into()),
        Some(p.PIN_24.into()),
        Some(p.PIN_25.into()),
        Some(p.PIN_26.into()),
        Some(p.PIN_27.into()),
        Some(p.PIN_28.into()),
        Some(p.PIN_29.into()),
    ]);

    let toggle = config.input.toggle_pin;
    let Some(gpio) = pins.take(toggle.pin) else {
        error!("Toggle pin gpio{} is not available", toggle.pin);
        panic!("toggle pin unavailable");
    };
    let pull = if toggle.pull_up { Pull::Up } else { Pull::None };
    let button = Inverted::new(ButtonInput(Input::new(gpio, pull)), toggle.inverted);
    let detector = EdgeDetector::new(toggle.pin, button.level());

    info!(
        "Toggle button on gpio{} (inverted={}, pull_up={})",
        toggle.pin, toggle.inverted, toggle.pull_up
    );

    if let Err(e) = link::send(MatrixCommand::Brightness(config.matrix.brightness)) {
        warn!("Failed to queue brightness: {:?}", e);
    }

    // Spawn tasks
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::link_tx_task(tx)).unwrap();
    spawner.spawn(tasks::button_task(button, detector)).unwrap();
    spawner
        .spawn(tasks::render_task(
            engine,
            builder,
            tasks::RenderConfig::from(&config.display),
        ))
        .unwrap();

    info!("All tasks spawned, clock running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration
///
/// build.rs already validated the file with a full TOML parser, so a
/// failure here means the two parsers disagree. There is no safe default
/// deadline to fall back to.
fn load_config() -> ClockConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration ({} metrics)", config.metrics.len());
            config
        }
        Err(e) => {
            error!("Failed to parse clock.toml at line {}: {:?}", e.line, e.kind);
            panic!("invalid clock.toml");
        }
    }
}
