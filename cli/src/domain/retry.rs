//! Retry policy for the ordered destroy.

use std::time::Duration;

/// How the cooldown grows between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry pass.
    Fixed(Duration),
    /// `base * 2^(n-1)` before the n-th retry pass.
    Exponential { base: Duration },
}

/// Bounded pass count plus the delay observed between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_passes: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Create a policy; a pass count of zero is clamped to one.
    #[must_use]
    pub fn new(max_passes: u32, backoff: Backoff) -> Self {
        Self {
            max_passes: max_passes.max(1),
            backoff,
        }
    }

    #[must_use]
    pub fn max_passes(&self) -> u32 {
        self.max_passes
    }

    /// Delay to observe before starting `pass` (1-based). Zero for pass 1.
    #[must_use]
    pub fn delay_before(&self, pass: u32) -> Duration {
        if pass <= 1 {
            return Duration::ZERO;
        }
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base } => {
                let exp = (pass - 2).min(16);
                base.saturating_mul(1u32 << exp)
            }
        }
    }

    /// Whether deletions in `pass` carry the force qualifier.
    #[must_use]
    pub fn forced(&self, pass: u32) -> bool {
        pass >= 2
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Backoff::Fixed(Duration::from_secs(30)))
    }
}
