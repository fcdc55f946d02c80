//! Polled trailing-edge debouncer with an optional max-wait bound.

/// Collapses bursts of values into the last one, released after a quiet period.
///
/// The host polls [`Debouncer::take_ready`] with the current time. With a
/// max-wait set, a value is also released once the burst has lasted that long,
/// so continuous input still produces regular output.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: u64,
    max_wait_ms: Option<u64>,
    pending: Option<Pending<T>>,
    last_fired_at: Option<u64>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    queued_at: u64,
    anchor: u64,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            max_wait_ms: None,
            pending: None,
            last_fired_at: None,
        }
    }

    #[must_use]
    pub const fn with_max_wait(mut self, max_wait_ms: Option<u64>) -> Self {
        self.max_wait_ms = max_wait_ms;
        self
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub const fn max_wait_ms(&self) -> Option<u64> {
        self.max_wait_ms
    }

    pub const fn set_timing(&mut self, delay_ms: u64, max_wait_ms: Option<u64>) {
        self.delay_ms = delay_ms;
        self.max_wait_ms = max_wait_ms;
    }

    /// Queue a value, replacing any pending one.
    pub fn queue(&mut self, value: T, now_ms: u64) {
        let anchor = match &self.pending {
            Some(pending) => pending.anchor,
            // A value arriving right after a flush continues the same burst.
            None => match self.last_fired_at {
                Some(fired) if now_ms.saturating_sub(fired) < self.delay_ms => fired,
                _ => now_ms,
            },
        };
        self.pending = Some(Pending {
            value,
            queued_at: now_ms,
            anchor,
        });
    }

    /// Take the pending value if its deadline has passed.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let deadline = self.deadline()?;
        if now_ms < deadline {
            return None;
        }
        self.last_fired_at = Some(now_ms);
        self.pending.take().map(|pending| pending.value)
    }

    /// Time at which the pending value becomes ready.
    pub fn deadline(&self) -> Option<u64> {
        let pending = self.pending.as_ref()?;
        let trailing = pending.queued_at.saturating_add(self.delay_ms);
        Some(match self.max_wait_ms {
            Some(max_wait) => trailing.min(pending.anchor.saturating_add(max_wait)),
            None => trailing,
        })
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.value)
    }
}
