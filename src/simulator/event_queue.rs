//! Event calendar and simulation clock for the clinic simulator

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::SimError;

/// Simulated time, in hours since the clinic opened.
pub type SimTime = f64;

/// A pending event together with its firing time and insertion sequence.
#[derive(Debug)]
pub struct SimEvent<E> {
    pub timestamp: SimTime,
    seq: u64,
    pub event: E,
}

impl<E> PartialEq for SimEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<E> Eq for SimEvent<E> {}
impl<E> PartialOrd for SimEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<E> Ord for SimEvent<E> {
    // BinaryHeap is a max-heap: reverse so the earliest (then first-scheduled) event wins.
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .total_cmp(&other.timestamp)
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

/// Simulation clock
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    pub current_time: SimTime,
}

impl SimClock {
    pub fn new() -> Self {
        Self { current_time: 0.0 }
    }

    /// Moves the clock forward to `t`. The calendar only ever calls this with
    /// the timestamp of the event it is about to hand out.
    pub fn advance_to(&mut self, t: SimTime) {
        debug_assert!(t >= self.current_time);
        self.current_time = t;
    }
}

/// Time-ordered set of pending events. Ties fire in scheduling order.
#[derive(Debug)]
pub struct EventCalendar<E> {
    queue: BinaryHeap<SimEvent<E>>,
    clock: SimClock,
    next_seq: u64,
}

impl<E> Default for EventCalendar<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventCalendar<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            clock: SimClock::new(),
            next_seq: 0,
        }
    }

    pub fn now(&self) -> SimTime {
        self.clock.current_time
    }

    /// Schedules `event` to fire at `at`.
    ///
    /// Scheduling into the past (or at a non-finite time) is a modelling bug
    /// and fails with [`SimError::CausalityViolation`].
    pub fn schedule(&mut self, event: E, at: SimTime) -> Result<(), SimError> {
        let now = self.now();
        if !at.is_finite() || at < now {
            return Err(SimError::CausalityViolation { scheduled: at, now });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(SimEvent {
            timestamp: at,
            seq,
            event,
        });
        Ok(())
    }

    /// Removes the earliest pending event and advances the clock to its time.
    pub fn next(&mut self) -> Option<(SimTime, E)> {
        let SimEvent {
            timestamp, event, ..
        } = self.queue.pop()?;
        self.clock.advance_to(timestamp);
        Some((timestamp, event))
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|e| e.timestamp)
    }

    /// Advances the clock without firing anything, e.g. to a run horizon.
    /// Times at or before the current clock are ignored.
    pub fn advance_idle_to(&mut self, t: SimTime) {
        if t > self.clock.current_time {
            self.clock.advance_to(t);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
