//! Matrix link receive task
//!
//! Receives frames from the matrix driver: presentation confirmations,
//! heartbeats and wall-clock time.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::Instant;
use embedded_io_async::Read;

use climeter_protocol::{FrameParser, MatrixCommand, MatrixEvent};

use crate::channels::{PRESENTED, WALL_CLOCK};
use crate::link;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match MatrixEvent::from_frame(&frame) {
                            Ok(event) => handle_event(event),
                            Err(e) => warn!("Failed to parse matrix event: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => warn!("Frame parse error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("UART read error: {:?}", e),
        }
    }
}

fn handle_event(event: MatrixEvent) {
    match event {
        MatrixEvent::Presented { seq } => {
            trace!("Frame {} presented", seq);
            PRESENTED.signal(seq);
        }
        MatrixEvent::Ping => {
            trace!("PING received");
            if let Err(e) = link::send(MatrixCommand::Pong) {
                warn!("Failed to queue PONG: {:?}", e);
            }
        }
        MatrixEvent::TimeSync { unix_ms } => {
            let first = !WALL_CLOCK.is_synced();
            WALL_CLOCK.sync(unix_ms, Instant::now().as_millis());
            if first {
                info!("Wall clock synced: {} ms since epoch", unix_ms);
            } else {
                debug!("Wall clock resynced: {} ms since epoch", unix_ms);
            }
        }
    }
}
