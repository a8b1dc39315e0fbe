/// Longest sleep between two delivery attempts, in seconds.
pub const MAX_BACKOFF_SECS: u64 = 300;

/// Doubling retry delay shared across delivery cycles.
///
/// The counter starts at one second and doubles after every failed attempt.
/// Internally it grows without bound; [`Backoff::wait_secs`] caps the value
/// read for sleeping at [`MAX_BACKOFF_SECS`]. It resets to one second only
/// on a successful delivery, so repeated cycle-over-cycle failures keep
/// escalating the delay instead of hammering a down backend every tick.
#[derive(Debug)]
pub struct Backoff {
    current_secs: u64,
}

impl Backoff {
    pub fn new() -> Self {
        Self { current_secs: 1 }
    }

    /// Seconds to sleep before the next attempt, capped at the maximum.
    pub fn wait_secs(&self) -> u64 {
        self.current_secs.min(MAX_BACKOFF_SECS)
    }

    /// Doubles the counter after a failed attempt.
    pub fn escalate(&mut self) {
        self.current_secs = self.current_secs.saturating_mul(2);
    }

    /// Resets to one second after any successful delivery.
    pub fn reset(&mut self) {
        self.current_secs = 1;
    }

    /// Raw (uncapped) counter value.
    pub fn current_secs(&self) -> u64 {
        self.current_secs
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_capped_at_read_time() {
        let mut backoff = Backoff::new();
        assert_eq!(backoff.wait_secs(), 1);

        for _ in 0..10 {
            backoff.escalate();
        }
        // 2^10 = 1024 internally, capped to 300 when read
        assert_eq!(backoff.current_secs(), 1024);
        assert_eq!(backoff.wait_secs(), MAX_BACKOFF_SECS);
    }

    #[test]
    fn reset_returns_to_one_second() {
        let mut backoff = Backoff::new();
        backoff.escalate();
        backoff.escalate();
        assert_eq!(backoff.wait_secs(), 4);

        backoff.reset();
        assert_eq!(backoff.wait_secs(), 1);
    }

    #[test]
    fn escalation_never_overflows() {
        let mut backoff = Backoff::new();
        for _ in 0..80 {
            backoff.escalate();
        }
        assert_eq!(backoff.wait_secs(), MAX_BACKOFF_SECS);
    }
}
