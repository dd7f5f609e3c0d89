//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::Clock;

/// Create a spinner for indeterminate progress.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
            .template("  {spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// `Clock` that shows a countdown spinner while it waits.
///
/// Falls back to a plain sleep when progress output is disabled.
pub struct SpinnerClock {
    show: bool,
}

impl SpinnerClock {
    #[must_use]
    pub fn new(show: bool) -> Self {
        Self { show }
    }
}

impl Clock for SpinnerClock {
    async fn sleep(&self, duration: Duration) {
        if !self.show || duration.is_zero() {
            tokio::time::sleep(duration).await;
            return;
        }
        let pb = spinner(&cooldown_message(duration));
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            let left = deadline.saturating_duration_since(tokio::time::Instant::now());
            if left.is_zero() {
                break;
            }
            pb.set_message(cooldown_message(left));
            tokio::time::sleep(left.min(Duration::from_secs(1))).await;
        }
        pb.finish_and_clear();
    }
}

fn cooldown_message(left: Duration) -> String {
    format!("waiting for Azure to settle ({}s)", left.as_secs())
}
