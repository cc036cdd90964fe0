use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A rotation timer fired.
///
/// Carries the generation of the timer that produced it, so ticks queued by
/// a timer that has since been replaced or stopped can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTick {
    pub generation: u64,
}

struct RotationTimer {
    handle: JoinHandle<()>,
    generation: u64,
}

/// Recurring timer that switches the page to a random video.
///
/// Two states: stopped (no timer) and running (exactly one timer). The timer
/// task only sends [`RotationTick`]s; the page decides what a tick does.
pub struct RotationScheduler {
    interval: Duration,
    timer: Option<RotationTimer>,
    generation: u64,

    /// Start of the current interval
    last_rotation: Instant,

    tick_tx: mpsc::UnboundedSender<RotationTick>,
}

impl RotationScheduler {
    pub fn new(interval: Duration, tick_tx: mpsc::UnboundedSender<RotationTick>) -> Self {
        Self {
            interval,
            timer: None,
            generation: 0,
            last_rotation: Instant::now(),
            tick_tx,
        }
    }

    /// Apply the stored flag at startup. Does not change the video.
    pub fn init(&mut self, enabled: bool) {
        if enabled {
            self.start_rotation();
        }
    }

    /// Start the timer, replacing any timer that is already running
    pub fn start_rotation(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
            log::debug!("Replacing rotation timer #{}", timer.generation);
        }

        self.generation += 1;
        let generation = self.generation;
        let interval = self.interval;
        let tx = self.tick_tx.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tx.send(RotationTick { generation }).is_err() {
                    break;
                }
            }
        });

        self.timer = Some(RotationTimer { handle, generation });
        self.last_rotation = Instant::now();

        log::info!(
            "Rotation running: next video in {}s (timer #{})",
            self.interval.as_secs(),
            generation
        );
    }

    /// Cancel the timer. Does nothing when already stopped.
    pub fn stop_rotation(&mut self) {
        match self.timer.take() {
            Some(timer) => {
                timer.handle.abort();
                log::info!("Rotation stopped (timer #{})", timer.generation);
            }
            None => log::debug!("Rotation already stopped"),
        }
    }

    /// Check whether a tick comes from the live timer, and restart the
    /// interval countdown if it does
    pub fn accept_tick(&mut self, tick: RotationTick) -> bool {
        match self.timer {
            Some(ref timer) if timer.generation == tick.generation => {
                self.last_rotation = Instant::now();
                true
            }
            _ => {
                log::debug!("Dropping stale rotation tick #{}", tick.generation);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next automatic change, if running
    pub fn time_until_rotation(&self) -> Option<Duration> {
        self.timer.as_ref()?;
        Some(self.interval.saturating_sub(self.last_rotation.elapsed()))
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}
