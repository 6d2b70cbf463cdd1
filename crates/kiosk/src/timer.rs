//! One-shot countdowns
//!
//! A countdown sleeps on the tokio timer and then posts its event to the
//! controller queue. Cancelling (or dropping) the handle aborts it.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Handle to a pending countdown
#[derive(Debug)]
pub struct Countdown {
    task: JoinHandle<()>,
}

impl Countdown {
    /// Post `event` on `tx` once `delay` has elapsed
    pub fn start<E>(delay: Duration, tx: UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The controller may already be gone at shutdown
            let _ = tx.send(event);
        });
        Self { task }
    }

    /// Stop the countdown if it has not fired yet
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
