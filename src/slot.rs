//! The settlement cell behind every promise handle.
//!
//! A `Slot` pairs a single-assignment cell with a list of wakers. Filling the
//! cell drains the list exactly once; any waiter that registers afterwards
//! sees the filled cell and never parks.
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::task::{Context, Poll, Waker};

use crate::Error;

#[derive(Debug)]
pub(crate) struct Slot<T> {
    cell: OnceLock<Result<T, Error>>,
    wakers: Mutex<Vec<Waker>>,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            wakers: Mutex::new(vec![]),
        }
    }

    pub(crate) fn get(&self) -> Option<&Result<T, Error>> {
        self.cell.get()
    }

    /// Stores `outcome` if the slot is still empty and wakes every waiter.
    ///
    /// Returns `false` (and drops `outcome`) when another caller got there
    /// first.
    pub(crate) fn fill(&self, outcome: Result<T, Error>) -> bool {
        if self.cell.set(outcome).is_err() {
            return false;
        }
        // The cell is written before the list is taken, so a waiter holding
        // the lock either already sees the outcome or gets drained here.
        let wakers = std::mem::take(&mut *self.lock_wakers());
        for waker in wakers {
            waker.wake();
        }
        true
    }

    pub(crate) fn poll_settled(&self, cx: &mut Context<'_>) -> Poll<&Result<T, Error>> {
        if let Some(outcome) = self.cell.get() {
            return Poll::Ready(outcome);
        }
        let mut wakers = self.lock_wakers();
        if let Some(outcome) = self.cell.get() {
            return Poll::Ready(outcome);
        }
        if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }

    fn lock_wakers(&self) -> MutexGuard<'_, Vec<Waker>> {
        // No user code runs under this lock, so a poisoned list is still intact.
        self.wakers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
