//! Matrix link transmit task
//!
//! Drains the outgoing queue onto the UART.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use climeter_protocol::MAX_FRAME_SIZE;

use crate::channels::OUTGOING;

#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let frame = OUTGOING.receive().await;
        match frame.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Failed to send frame 0x{:02x}: {:?}", frame.msg_type, e);
                }
            }
            Err(e) => warn!("Failed to encode frame: {:?}", e),
        }
    }
}
