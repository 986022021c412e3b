use std::time::Duration;

mod channel;
mod controller;
mod phase;


pub use channel::BlockingChannel;
pub use controller::{ControllerConfig, PhaseController};
pub use phase::Phase;

pub type Result<T> = color_eyre::Result<T>;

/// Builds a controller with the default timing (4 to 6 second cycles,
/// 1ms polling) and starts its background worker.
pub fn start_controller() -> Result<PhaseController> {
    let config = ControllerConfig {
        min_cycle: Duration::from_millis(4000),
        max_cycle: Duration::from_millis(6000),
        poll_interval: Duration::from_millis(1),
    };

    let controller = PhaseController::new(config);
    controller.start()?;

    Ok(controller)
}
