//! Toggle button edge task
//!
//! Waits for pin edges and posts them to the latch. Debouncing happens in
//! the render loop, against the timestamps recorded here.

use defmt::*;
use embassy_time::Instant;

use climeter_core::input::EdgeDetector;
use climeter_hal::Inverted;

use crate::board::ButtonInput;
use crate::channels::BUTTON_EDGE;

#[embassy_executor::task]
pub async fn button_task(mut pin: Inverted<ButtonInput>, mut detector: EdgeDetector) {
    info!("Button task started on gpio{}", detector.pin());

    loop {
        pin.inner_mut().0.wait_for_any_edge().await;

        let at_ms = Instant::now().as_millis();
        if let Some(event) = detector.poll(&pin, at_ms) {
            trace!("Edge: {:?}", event);
            if let Some(dropped) = BUTTON_EDGE.post(event) {
                // Render loop did not run in between; a pending press outlives its release
                trace!("Dropped edge at {} ms", dropped.at_ms);
            }
        }
    }
}
