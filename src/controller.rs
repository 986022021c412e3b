use std::{
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::bail;
use rand::Rng;
use tracing::debug;

use crate::{channel::BlockingChannel, phase::Phase, Result};

/// Timing knobs for the background toggling worker.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Shortest possible cycle between two toggles.
    pub min_cycle: Duration,
    /// Longest possible cycle between two toggles.
    pub max_cycle: Duration,
    /// Sleep granularity of the worker's elapsed-time polling.
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            min_cycle: Duration::from_millis(4000),
            max_cycle: Duration::from_millis(6000),
            poll_interval: Duration::from_millis(1),
        }
    }
}

pub struct PhaseController {
    pub config: ControllerConfig,

    /// Latest committed phase. Written by the worker only, readable from any
    /// thread.
    phase: Arc<AtomicU8>,

    /// Notification stream of transitions. One entry per toggle; the
    /// authoritative state lives in `phase`, not here.
    channel: Arc<BlockingChannel<Phase>>,

    /// Whether the worker has been started.
    started: AtomicBool,

    /// Cleared by `stop` to cancel the worker loop.
    running: Arc<AtomicBool>,

    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl PhaseController {
    pub fn new(config: ControllerConfig) -> Self {
        PhaseController {
            config,
            phase: Arc::new(AtomicU8::new(Phase::Red as u8)),
            channel: Arc::new(BlockingChannel::new()),
            started: AtomicBool::new(false),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the background toggling worker and returns immediately.
    ///
    /// The worker is spawned at most once per controller; a second call is an
    /// error.
    pub fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            bail!("phase controller already started");
        }

        self.running.store(true, Ordering::SeqCst);

        let config = self.config.clone();
        let phase = Arc::clone(&self.phase);
        let channel = Arc::clone(&self.channel);
        let running = Arc::clone(&self.running);

        let handle = thread::spawn(move || Self::cycle_worker(config, phase, channel, running));
        *self.worker.lock().unwrap() = Some(handle);

        debug!("phase worker started");

        Ok(())
    }

    /// Cancels the worker and waits for it to exit.
    ///
    /// Safe to call repeatedly; a `stop` without a prior `start` is a no-op.
    pub fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);

        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                bail!("phase worker panicked");
            }
            debug!("phase worker stopped");
        }

        Ok(())
    }

    /// Latest committed phase. Never blocks.
    pub fn current_phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Blocks until the worker publishes its next transition.
    pub fn next_transition(&self) -> Phase {
        self.channel.recv()
    }

    /// Like [`PhaseController::next_transition`], but gives up after
    /// `timeout`.
    pub fn next_transition_timeout(&self, timeout: Duration) -> Option<Phase> {
        self.channel.recv_timeout(timeout)
    }

    /// Blocks until `target` is published to the notification stream,
    /// discarding transitions to the other phase.
    ///
    /// Driven purely by notifications; the current phase is never consulted.
    /// Blocks forever if the worker is not running.
    pub fn wait_for_phase(&self, target: Phase) {
        loop {
            if self.next_transition() == target {
                return;
            }
        }
    }

    /// Like [`PhaseController::wait_for_phase`], with an overall deadline.
    /// Returns `false` if `target` was not published in time.
    pub fn wait_for_phase_timeout(&self, target: Phase, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) => remaining,
                None => return false,
            };

            match self.next_transition_timeout(remaining) {
                Some(phase) if phase == target => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// The background toggling loop.
    ///
    /// Sleeps in `poll_interval` steps until the elapsed time exceeds the
    /// drawn cycle duration, then toggles the phase, commits it to the shared
    /// cell and publishes it to the channel. The duration is redrawn after
    /// every toggle. Runs until `running` is cleared.
    fn cycle_worker(
        config: ControllerConfig,
        phase: Arc<AtomicU8>,
        channel: Arc<BlockingChannel<Phase>>,
        running: Arc<AtomicBool>,
    ) {
        let mut last_toggle = Instant::now();
        let mut cycle = draw_cycle(&config);

        while running.load(Ordering::SeqCst) {
            thread::sleep(config.poll_interval);

            if last_toggle.elapsed() < cycle {
                continue;
            }

            let next = Phase::from_u8(phase.load(Ordering::SeqCst)).toggle();
            phase.store(next as u8, Ordering::SeqCst);
            channel.send(next);
            debug!("phase toggled to {next}");

            last_toggle = Instant::now();
            cycle = draw_cycle(&config);
        }
    }
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Drop for PhaseController {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Draws a cycle duration uniformly from the closed
/// `[min_cycle, max_cycle]` interval.
fn draw_cycle(config: &ControllerConfig) -> Duration {
    let min = config.min_cycle.as_millis() as u64;
    let max = config.max_cycle.as_millis() as u64;

    Duration::from_millis(rand::rng().random_range(min..=max))
}
