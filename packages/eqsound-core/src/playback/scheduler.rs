//! Cooperative timer primitives
//!
//! Everything here is single-threaded: a tick runs to completion before the next timer
//! is examined, so cancellation is a shared `Cell<bool>` rather than an atomic.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shared cancellation flag held by a session and every timer it scheduled
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Scheduling collaborator: arrange for a tick after `delay` unless `token` is cancelled
pub trait Scheduler {
    fn schedule_after(&mut self, delay: Duration, token: CancelToken);
}

#[derive(Debug, Clone)]
struct Timer {
    deadline: Instant,
    token: CancelToken,
}

/// Deadline-ordered timer queue driven by an event loop.
///
/// `schedule_after` measures delays from the queue's notion of "now", which the loop
/// moves forward with [`TimerQueue::pop_due`].
#[derive(Debug, Clone)]
pub struct TimerQueue {
    now: Instant,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            timers: Vec::new(),
        }
    }

    fn discard_cancelled(&mut self) {
        self.timers.retain(|t| !t.token.is_cancelled());
    }

    /// Earliest deadline among live timers
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_cancelled();
        self.timers.iter().map(|t| t.deadline).min()
    }

    /// Remove and return the earliest live timer due at or before `now`.
    ///
    /// Also moves the queue's clock to `now`, so timers scheduled by the tick that
    /// handles this one are measured from the moment it fired.
    pub fn pop_due(&mut self, now: Instant) -> Option<CancelToken> {
        if now > self.now {
            self.now = now;
        }
        self.discard_cancelled();
        let (position, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| t.deadline)?;
        Some(self.timers.remove(position).token)
    }

    /// Remove every live timer due at or before `now`, earliest first.
    ///
    /// Timers scheduled while the returned batch is handled belong to the next batch,
    /// even when their deadline is already past.
    pub fn take_due(&mut self, now: Instant) -> Vec<CancelToken> {
        if now > self.now {
            self.now = now;
        }
        self.discard_cancelled();
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = pending;
        due.sort_by_key(|t| t.deadline);
        due.into_iter().map(|t| t.token).collect()
    }

    /// Cancel and drop every pending timer
    pub fn cancel_all(&mut self) {
        for timer in self.timers.drain(..) {
            timer.token.cancel();
        }
    }

    /// Number of live timers
    pub fn len(&mut self) -> usize {
        self.discard_cancelled();
        self.timers.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }
}

impl Scheduler for TimerQueue {
    fn schedule_after(&mut self, delay: Duration, token: CancelToken) {
        self.timers.push(Timer {
            deadline: self.now + delay,
            token,
        });
    }
}

/// Source of "now" for an event loop, and a way to wait for a deadline
pub trait Clock {
    fn now(&mut self) -> Instant;
    fn sleep_until(&mut self, deadline: Instant);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}
