use std::time::Duration;

/// Configuration for source confirmation and destination completion polling.
///
/// Use the builder methods to customize, or use the preset for local devnets.
///
/// # Examples
///
/// ```rust
/// use nft_bridge::PollingConfig;
/// use std::time::Duration;
///
/// // Defaults: poll every 5 s after a 10 s head start, give up after 5 min
/// let config = PollingConfig::default();
///
/// // Customize polling behavior
/// let config = PollingConfig::default()
///     .with_poll_interval(Duration::from_secs(3))
///     .with_timeout(Duration::from_secs(600));
///
/// // Preset for in-process devnets where delivery is immediate
/// let config = PollingConfig::fast();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Time between two destination owner queries.
    pub poll_interval: Duration,
    /// Time after source confirmation before the first destination query.
    pub initial_delay: Duration,
    /// Total time the completion watch waits, measured from source
    /// confirmation and including the initial delay.
    pub timeout: Duration,
    /// Time between two source receipt queries.
    pub receipt_poll_interval: Duration,
    /// Receipt queries before the source transaction is given up on.
    pub max_receipt_attempts: u32,
}

impl Default for PollingConfig {
    /// - `poll_interval`: 5 s
    /// - `initial_delay`: 10 s
    /// - `timeout`: 5 min
    /// - `receipt_poll_interval`: 2 s
    /// - `max_receipt_attempts`: 90 (3 min)
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            initial_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(5 * 60),
            receipt_poll_interval: Duration::from_secs(2),
            max_receipt_attempts: 90,
        }
    }
}

impl PollingConfig {
    /// Short intervals for devnets where messages land within seconds.
    pub fn fast() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            initial_delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
            receipt_poll_interval: Duration::from_millis(250),
            max_receipt_attempts: 40,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    pub fn with_max_receipt_attempts(mut self, attempts: u32) -> Self {
        self.max_receipt_attempts = attempts;
        self
    }

    /// Upper bound on destination queries a watch can issue.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nft_bridge::PollingConfig;
    ///
    /// // (300 s - 10 s) / 5 s, plus the query at the deadline
    /// assert_eq!(PollingConfig::default().max_completion_polls(), 59);
    /// ```
    pub fn max_completion_polls(&self) -> u64 {
        if self.poll_interval.is_zero() {
            return 1;
        }
        let window = self.timeout.saturating_sub(self.initial_delay);
        (window.as_millis() / self.poll_interval.as_millis()) as u64 + 1
    }
}
