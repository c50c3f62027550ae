use crate::view::FeedbackForm;
use core::time::Duration;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle, time};

/// Timing of the automatic reset after a successful submission. The form first waits for
/// `delay`, then counts down once per `tick`. The reset fires when the countdown drops
/// below zero, so the confirmation stays up for `delay + tick * (countdown + 1)`. A zero
/// `tick` skips the countdown altogether.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub delay: Duration,
    pub tick: Duration,
    pub countdown: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self { delay: Duration::from_millis(50), tick: Duration::from_millis(2500), countdown: 1 }
    }
}

impl Schedule {
    /// Total time from scheduling until the form is reset.
    pub fn deadline(&self) -> Duration {
        self.delay.saturating_add(self.tick.saturating_mul(self.countdown.saturating_add(1)))
    }

    /// Spawns the reset task. Aborting the returned handle cancels the reset.
    pub fn spawn(self, form: Arc<Mutex<FeedbackForm>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            time::sleep(self.delay).await;

            if !self.tick.is_zero() {
                let mut interval = time::interval(self.tick);
                // The first tick completes immediately.
                interval.tick().await;

                let mut left = i64::from(self.countdown);
                while left >= 0 {
                    interval.tick().await;
                    left -= 1;
                    log::debug!("feedback form countdown at {left}");
                }
            }

            form.lock().await.reset();
            log::debug!("feedback form has been reset");
        })
    }
}
