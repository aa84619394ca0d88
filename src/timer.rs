use std::time::Duration;

/// Repeating timer advanced by frame deltas instead of the host event loop.
#[derive(Clone, Debug)]
pub struct Interval {
    period: Duration,
    pending: Duration,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "interval period must be non-zero");
        Self {
            period,
            pending: Duration::ZERO,
        }
    }

    pub fn from_millis(period_ms: u64) -> Self {
        Self::new(Duration::from_millis(period_ms))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Advances by `dt` and returns how many periods elapsed.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        self.pending += dt;
        let mut fired = 0;
        while self.pending >= self.period {
            self.pending -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.pending = Duration::ZERO;
    }
}

/// One-shot timer. Fires once, then stays idle until armed again.
#[derive(Clone, Debug, Default)]
pub struct Delay {
    remaining: Option<Duration>,
}

impl Delay {
    pub fn arm(&mut self, after: Duration) {
        self.remaining = Some(after);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(left) if left <= dt => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}
