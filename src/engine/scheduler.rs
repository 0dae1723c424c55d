use std::{cmp::Ordering, collections::BinaryHeap};

/// Wake-ups within this many seconds of a deadline count as due.
const DUE_EPSILON: f64 = 1e-6;

struct Entry<T> {
    due: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // reversed: BinaryHeap is a max-heap and we want the earliest first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Fire-and-forget timer queue on a virtual clock.
///
/// Nothing here reads a wall clock: time only moves when the owner pops due
/// tasks or sets it explicitly. Tasks due at the same instant come out in the
/// order they were scheduled.
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    now: f64,
    seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            now: 0.0,
            seq: 0,
        }
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `task` `delay` seconds from now. Negative delays run at `now`.
    pub fn schedule_after(&mut self, task: T, delay: f64) {
        let due = self.now + delay.max(0.0);
        self.queue.push(Entry {
            due,
            seq: self.seq,
            task,
        });
        self.seq += 1;
    }

    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.due)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// deadline.
    pub fn pop_due(&mut self, until: f64) -> Option<T> {
        if self.queue.peek()?.due > until + DUE_EPSILON {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Move the clock forward. Never moves it back.
    pub fn set_now(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
