//! Deferred execution queue
//!
//! `wait(seconds) { body }` schedules its body instead of blocking. The
//! batch evaluator has no host event loop, so deadlines run on a virtual
//! clock: tasks are kept in a min-heap ordered by absolute deadline (FIFO
//! among equal deadlines), and draining the queue advances the clock to
//! each task's deadline. Event order therefore matches what real timers
//! would produce.

use crate::compiler::parser::stmt::Stmt;
use crate::runtime::scope::ScopeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

/// One deferred body
pub struct ScheduledTask {
    /// Absolute deadline on the virtual clock, in microseconds
    pub deadline_us: u64,
    /// Tie-breaker preserving scheduling order among equal deadlines
    pub seq: u64,
    /// The `wait` block's body
    pub body: Rc<Vec<Stmt>>,
    /// Scope the block was reached in; the body reenters it
    pub scope: ScopeRef,
    /// File attribution for events raised by the body
    pub source_file: Option<String>,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.deadline_us == other.deadline_us && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest
        // deadline (then lowest seq) on top
        other
            .deadline_us
            .cmp(&self.deadline_us)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Timer queue plus the run's virtual clock
pub struct Scheduler {
    queue: BinaryHeap<ScheduledTask>,
    next_seq: u64,
    virtual_now_us: u64,
    /// Total tasks accepted, bounded by config
    scheduled_count: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
            virtual_now_us: 0,
            scheduled_count: 0,
        }
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.virtual_now_us as f64 / 1000.0
    }

    /// Schedule a body `delay_seconds` from now; delays are measured from
    /// when the `wait` block is reached, so nested waits compose
    pub fn schedule(
        &mut self,
        delay_seconds: f64,
        body: Rc<Vec<Stmt>>,
        scope: ScopeRef,
        source_file: Option<String>,
    ) {
        let delay_us = if delay_seconds.is_finite() && delay_seconds > 0.0 {
            (delay_seconds * 1_000_000.0) as u64
        } else {
            0
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.scheduled_count += 1;
        self.queue.push(ScheduledTask {
            deadline_us: self.virtual_now_us + delay_us,
            seq,
            body,
            scope,
            source_file,
        });
    }

    /// Pop the next task and advance the virtual clock to its deadline
    pub fn pop_next(&mut self) -> Option<ScheduledTask> {
        let task = self.queue.pop()?;
        self.virtual_now_us = self.virtual_now_us.max(task.deadline_us);
        Some(task)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled_count
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::scope::Scope;

    fn empty_body() -> Rc<Vec<Stmt>> {
        Rc::new(Vec::new())
    }

    #[test]
    fn test_pop_order_by_deadline() {
        let mut scheduler = Scheduler::new();
        let scope = Scope::new_global();
        scheduler.schedule(2.0, empty_body(), scope.clone(), Some("/a.fxo".into()));
        scheduler.schedule(1.0, empty_body(), scope.clone(), Some("/b.fxo".into()));

        let first = scheduler.pop_next().unwrap();
        assert_eq!(first.source_file.as_deref(), Some("/b.fxo"));
        let second = scheduler.pop_next().unwrap();
        assert_eq!(second.source_file.as_deref(), Some("/a.fxo"));
        assert!(scheduler.pop_next().is_none());
    }

    #[test]
    fn test_equal_deadlines_are_fifo() {
        let mut scheduler = Scheduler::new();
        let scope = Scope::new_global();
        scheduler.schedule(1.0, empty_body(), scope.clone(), Some("/first.fxo".into()));
        scheduler.schedule(1.0, empty_body(), scope.clone(), Some("/second.fxo".into()));

        assert_eq!(
            scheduler.pop_next().unwrap().source_file.as_deref(),
            Some("/first.fxo")
        );
        assert_eq!(
            scheduler.pop_next().unwrap().source_file.as_deref(),
            Some("/second.fxo")
        );
    }

    #[test]
    fn test_clock_advances_to_deadline() {
        let mut scheduler = Scheduler::new();
        let scope = Scope::new_global();
        scheduler.schedule(0.5, empty_body(), scope, None);
        assert_eq!(scheduler.now_ms(), 0.0);
        let _ = scheduler.pop_next();
        assert_eq!(scheduler.now_ms(), 500.0);
    }

    #[test]
    fn test_nested_delays_measure_from_scheduling_time() {
        let mut scheduler = Scheduler::new();
        let scope = Scope::new_global();
        scheduler.schedule(1.0, empty_body(), scope.clone(), Some("/outer.fxo".into()));
        let _ = scheduler.pop_next(); // now at 1s
        scheduler.schedule(1.0, empty_body(), scope, Some("/inner.fxo".into()));
        let inner = scheduler.pop_next().unwrap();
        assert_eq!(inner.deadline_us, 2_000_000);
    }

    #[test]
    fn test_fractional_and_nonpositive_delays() {
        let mut scheduler = Scheduler::new();
        let scope = Scope::new_global();
        scheduler.schedule(0.001, empty_body(), scope.clone(), None);
        scheduler.schedule(-5.0, empty_body(), scope, None);
        // The negative delay clamps to "now" and was scheduled later, so
        // it still pops after nothing but its own deadline ordering
        let first = scheduler.pop_next().unwrap();
        assert_eq!(first.deadline_us, 0);
        let second = scheduler.pop_next().unwrap();
        assert_eq!(second.deadline_us, 1_000);
    }
}
