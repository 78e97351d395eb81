//! Playback pacing.

use heapviz_trace::Step;
use std::time::Duration;

/// Decides how long to wait after each applied step.
pub trait Pacer {
    fn pause(&mut self, step: &Step);
}

/// Never waits. Used by tests and batch output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pause(&mut self, _step: &Step) {}
}

/// Sleeps a fixed delay after every step except `Done`.
#[derive(Debug, Clone, Copy)]
pub struct SleepPacer {
    delay: Duration,
}

impl SleepPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self, step: &Step) {
        if !self.delay.is_zero() && *step != Step::Done {
            std::thread::sleep(self.delay);
        }
    }
}

impl<F> Pacer for F
where
    F: FnMut(&Step),
{
    fn pause(&mut self, step: &Step) {
        self(step)
    }
}
