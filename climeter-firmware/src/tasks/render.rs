//! Render loop
//!
//! Once per tick: read the wall clock, sample the engine with the pending
//! button edge, build a frame, send it and wait until the matrix has
//! presented it.

use defmt::*;
use embassy_time::{with_timeout, Duration, Instant, Ticker};

use climeter_core::config::DisplayConfig;
use climeter_core::traits::{SyncedClock, WallClock};
use climeter_core::ClockEngine;
use climeter_display::present::command_count;
use climeter_display::{present, FrameBuilder, RenderFrame};

use crate::channels::{BUTTON_EDGE, PRESENTED, WALL_CLOCK};
use crate::link::{self, LinkBackend};

/// Timing for the render loop
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub refresh_ms: u32,
    pub present_timeout_ms: u32,
}

impl From<&DisplayConfig> for RenderConfig {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            refresh_ms: display.refresh_ms,
            present_timeout_ms: display.present_timeout_ms,
        }
    }
}

#[embassy_executor::task]
pub async fn render_task(mut engine: ClockEngine, builder: FrameBuilder, config: RenderConfig) {
    info!("Render task started ({} ms tick)", config.refresh_ms);

    let mut ticker = Ticker::every(Duration::from_millis(config.refresh_ms.into()));
    let timeout = Duration::from_millis(config.present_timeout_ms.into());
    let clock = SyncedClock::new(&WALL_CLOCK, || Instant::now().as_millis());
    let mut backend = LinkBackend::new();
    let mut timeouts: u32 = 0;

    loop {
        let event = BUTTON_EDGE.take();

        let frame = match clock.now() {
            Some(now) => {
                let snapshot = engine.tick(now, event);
                if snapshot.mode_changed {
                    info!("Display mode: {}", snapshot.mode);
                }
                builder.build(&snapshot)
            }
            None => {
                if event.is_some() {
                    debug!("Button edge ignored until the clock is synced");
                }
                builder.build_syncing()
            }
        };

        match frame {
            Ok(frame) => {
                if send_and_wait(&frame, &mut backend, timeout).await {
                    if timeouts > 0 {
                        info!("Matrix responding again after {} timeouts", timeouts);
                    }
                    timeouts = 0;
                } else {
                    timeouts = timeouts.saturating_add(1);
                }
            }
            Err(e) => warn!("Failed to build frame: {:?}", e),
        }

        ticker.next().await;
    }
}

/// Returns `true` once the matrix confirmed the frame
async fn send_and_wait(frame: &RenderFrame, backend: &mut LinkBackend, timeout: Duration) -> bool {
    // The whole screen goes out or none of it
    if with_timeout(timeout, link::reserve(command_count(frame))).await.is_err() {
        warn!("Link queue still full after {} ms", timeout.as_millis());
        return false;
    }

    PRESENTED.reset();
    if let Err(e) = present(frame, backend) {
        warn!("Failed to queue frame: {:?}", e);
        return false;
    }

    let seq = backend.seq();
    match with_timeout(timeout, wait_presented(seq)).await {
        Ok(()) => true,
        Err(_) => {
            warn!("Frame {} not presented within {} ms", seq, timeout.as_millis());
            false
        }
    }
}

async fn wait_presented(seq: u8) {
    // Late confirmations for earlier frames are skipped
    while PRESENTED.wait().await != seq {}
}
