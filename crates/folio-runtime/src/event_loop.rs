//! Event Loop Implementation
//!
//! Virtual-time timer queue. Nothing here sleeps: the owner asks for the next
//! due timer up to some instant and runs it. Time is measured in
//! milliseconds from loop creation.
//!
//! Due timers fire in order of due time, then creation order. An interval is
//! re-armed one period after the instant it fired.

/// Timer handle, unique for the life of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// One-shot or repeating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Timeout,
    Interval { period_ms: u64 },
}

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: u64,
    kind: TimerKind,
    payload: T,
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    /// Virtual instant it fired at
    pub at: u64,
    pub payload: T,
}

/// Cooperative event loop
#[derive(Debug)]
pub struct EventLoop<T> {
    timers: Vec<Timer<T>>,
    next_timer_id: u64,
    current_time: u64,
}

impl<T> Default for EventLoop<T> {
    fn default() -> Self {
        Self { timers: Vec::new(), next_timer_id: 1, current_time: 0 }
    }
}

impl<T: Clone> EventLoop<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.current_time
    }

    /// Run `payload` once, `delay_ms` from now
    pub fn set_timeout(&mut self, payload: T, delay_ms: u64) -> TimerId {
        self.insert(payload, delay_ms, TimerKind::Timeout)
    }

    /// Run `payload` every `period_ms` (at least 1), first time one period from now
    pub fn set_interval(&mut self, payload: T, period_ms: u64) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(payload, period_ms, TimerKind::Interval { period_ms })
    }

    fn insert(&mut self, payload: T, delay_ms: u64, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        self.timers.push(Timer {
            id,
            due: self.current_time.saturating_add(delay_ms),
            kind,
            payload,
        });
        id
    }

    /// Cancel a timeout/interval. Returns whether it was still pending.
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    /// Is the timer still scheduled?
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Kind of a pending timer
    pub fn kind(&self, id: TimerId) -> Option<TimerKind> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.kind)
    }

    /// Earliest due instant among pending timers
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the next timer due at or before `until`, moving the clock to its
    /// due instant. Intervals stay scheduled.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired<T>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let due = self.timers[index].due;
        self.current_time = self.current_time.max(due);

        let timer = &mut self.timers[index];
        match timer.kind {
            TimerKind::Interval { period_ms } => {
                timer.due = self.current_time.saturating_add(period_ms);
                Some(Fired { id: timer.id, at: self.current_time, payload: timer.payload.clone() })
            }
            TimerKind::Timeout => {
                let timer = self.timers.swap_remove(index);
                Some(Fired { id: timer.id, at: self.current_time, payload: timer.payload })
            }
        }
    }

    /// Move the clock forward without running anything
    pub fn advance_to(&mut self, instant: u64) {
        self.current_time = self.current_time.max(instant);
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Number of pending intervals
    pub fn intervals(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(t.kind, TimerKind::Interval { .. }))
            .count()
    }

    /// Check if there's pending work
    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty()
    }
}
