use tokio::time::{Duration, Instant};

/// Twitch allows 20 commands or messages per 30 seconds
pub const DEFAULT_CEILING: u32 = 20;

/// Ceiling when the bot only talks in channels where it is a moderator
pub const MODERATOR_CEILING: u32 = 100;

pub const WINDOW: Duration = Duration::from_secs(30);

/// Admission check for outbound lines.
///
/// The window sits on a fixed grid anchored at the instant the limiter
/// was created: the reference only ever moves forward in whole
/// [`WINDOW`] steps, so variable call timing never drifts it.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    reference: Instant,
    count: u32,
    ceiling: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(ceiling: u32, start: Instant) -> Self {
        Self {
            reference: start,
            count: 0,
            ceiling,
            window: WINDOW,
        }
    }

    /// Decide whether one more line may be sent at `now`.
    ///
    /// Denied lines are the caller's to drop; nothing is queued here.
    pub fn allow(&mut self, now: Instant) -> bool {
        self.advance(now);

        if self.count < self.ceiling {
            self.count += 1;
            true
        } else {
            false
        }
    }

    /// Sends left in the current window, without consuming one
    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.count)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    fn advance(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.reference);
        if elapsed < self.window {
            return;
        }

        // Skip every window that passed while idle, staying on the grid
        let steps = (elapsed.as_nanos() / self.window.as_nanos()) as u32;
        self.reference += self.window * steps;
        self.count = 0;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING, Instant::now())
    }
}
