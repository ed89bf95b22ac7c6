//! The engine's single timer (spec.md §4.4 item 4: "schedules a single
//! timer ... coalescing wake-ups"), grounded on `engine_impl.hpp`'s
//! `asio::steady_timer timer` + `reschedule`/`on_timer`.

use std::time::{Duration, Instant};

use tokio::time::Sleep;

pin_project_lite::pin_project! {
    /// Wraps a `tokio::time::Sleep` that gets re-armed to the next
    /// deadline after every ingest/callback batch, never firing more often
    /// than the state machine actually requires.
    pub struct EngineTimer {
        #[pin]
        sleep: Sleep,
        deadline: Option<Instant>,
    }
}

impl EngineTimer {
    #[must_use]
    pub fn new() -> Self {
        EngineTimer { sleep: tokio::time::sleep(Duration::from_secs(3600)), deadline: None }
    }

    /// Rearms the timer to `next`, coalescing repeated requests for the
    /// same deadline (`engine_impl::reschedule`).
    pub fn rearm(self: std::pin::Pin<&mut Self>, next: Option<Duration>) {
        let mut this = self.project();
        let Some(next) = next else {
            *this.deadline = None;
            this.sleep.as_mut().reset(tokio::time::Instant::now() + Duration::from_secs(3600));
            return;
        };
        let deadline = Instant::now() + next;
        if *this.deadline != Some(deadline) {
            *this.deadline = Some(deadline);
            this.sleep.as_mut().reset(tokio::time::Instant::now() + next);
        }
    }

    pub async fn wait(self: std::pin::Pin<&mut Self>) {
        self.project().sleep.await;
    }
}

impl Default for EngineTimer {
    fn default() -> Self {
        Self::new()
    }
}
