//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod button;
pub mod link_rx;
pub mod link_tx;
pub mod render;

pub use button::button_task;
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
pub use render::{render_task, RenderConfig};
