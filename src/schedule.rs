/// Cooperative timers.
///
/// Every periodic task of a round owns one of these and is driven by elapsed
/// milliseconds from the round's single logical thread.  A cancelled timer
/// never fires again until it is explicitly restarted.

/// Repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    period_ms: u64,
    elapsed_ms: u64,
    active: bool,
}

impl Interval {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            active: true,
        }
    }

    /// An interval that does not run until `restart` is called.
    pub fn stopped(period_ms: u64) -> Self {
        Self {
            active: false,
            ..Self::new(period_ms)
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start counting a fresh period.
    pub fn restart(&mut self) {
        self.elapsed_ms = 0;
        self.active = true;
    }

    /// Replace the period and start counting it from zero.
    pub fn restart_with(&mut self, period_ms: u64) {
        self.period_ms = period_ms.max(1);
        self.restart();
    }

    /// Idempotent.
    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed_ms = 0;
    }

    /// Advance by `dt_ms`, returning how many times the task is due.
    pub fn advance(&mut self, dt_ms: u64) -> u32 {
        if !self.active {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let fires = self.elapsed_ms / self.period_ms;
        self.elapsed_ms %= self.period_ms;
        fires as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimeoutState {
    Pending,
    Fired,
    Cancelled,
}

/// One-shot timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout {
    delay_ms: u64,
    elapsed_ms: u64,
    state: TimeoutState,
}

impl Timeout {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            elapsed_ms: 0,
            state: TimeoutState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimeoutState::Pending
    }

    /// Idempotent; a fired timeout stays fired.
    pub fn cancel(&mut self) {
        if self.state == TimeoutState::Pending {
            self.state = TimeoutState::Cancelled;
        }
    }

    /// True exactly once, on the advance that reaches the delay.
    pub fn advance(&mut self, dt_ms: u64) -> bool {
        if self.state != TimeoutState::Pending {
            return false;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.delay_ms {
            self.state = TimeoutState::Fired;
            return true;
        }
        false
    }
}
