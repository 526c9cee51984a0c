//! Cooperative cancellation for adapter operations.
//!
//! An [`AbortHandle`] and its [`AbortToken`]s share one flag. Operations that
//! accept a token race the native work against the abort signal via
//! [`race_abort`], which prefers the abort outcome and never polls the
//! operation when the token is already aborted.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use futures::future::{select, Either};

use crate::error::CapabilityError;

#[derive(Debug, Default)]
struct AbortFlag {
    aborted: Cell<bool>,
    next_waiter: Cell<u64>,
    // One slot per pending Aborted future, keyed by waiter id; a slot is
    // replaced on re-poll and removed when its future is dropped, so the
    // map never grows past the number of live waiters.
    wakers: RefCell<BTreeMap<u64, Waker>>,
}

/// Owner side of a cancellation pair.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Rc<AbortFlag>,
}

impl AbortHandle {
    /// Creates a fresh, un-aborted handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token observing this handle's abort flag.
    pub fn token(&self) -> AbortToken {
        AbortToken {
            flag: Rc::clone(&self.flag),
        }
    }

    /// Signals abort to every token and wakes pending waiters. Idempotent.
    pub fn abort(&self) {
        if self.flag.aborted.replace(true) {
            return;
        }
        let wakers = std::mem::take(&mut *self.flag.wakers.borrow_mut());
        for waker in wakers.into_values() {
            waker.wake();
        }
    }
}

/// Observer side of a cancellation pair, passed into adapter operations.
#[derive(Debug, Clone)]
pub struct AbortToken {
    flag: Rc<AbortFlag>,
}

impl AbortToken {
    /// Returns whether abort has been signalled.
    pub fn is_aborted(&self) -> bool {
        self.flag.aborted.get()
    }

    /// Returns a future that resolves once abort is signalled.
    pub fn aborted(&self) -> Aborted<'_> {
        Aborted {
            token: self,
            key: None,
        }
    }
}

/// Future returned by [`AbortToken::aborted`].
///
/// Holds at most one waker slot on the shared flag; the slot is released
/// when the future resolves or is dropped.
pub struct Aborted<'a> {
    token: &'a AbortToken,
    key: Option<u64>,
}

impl Future for Aborted<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.token.is_aborted() {
            // Abort already drained the waker map; nothing to release.
            this.key = None;
            return Poll::Ready(());
        }
        let flag = &this.token.flag;
        let key = *this.key.get_or_insert_with(|| {
            let key = flag.next_waiter.get();
            flag.next_waiter.set(key + 1);
            key
        });
        let mut wakers = flag.wakers.borrow_mut();
        match wakers.get(&key) {
            Some(existing) if existing.will_wake(cx.waker()) => {}
            _ => {
                wakers.insert(key, cx.waker().clone());
            }
        }
        Poll::Pending
    }
}

impl Drop for Aborted<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.token.flag.wakers.borrow_mut().remove(&key);
        }
    }
}

/// Races `operation` against cancellation.
///
/// With no token the operation runs to completion. With an already-aborted
/// token the call rejects before the operation is polled, so no native side
/// effect occurs. When both outcomes are ready the abort wins.
///
/// # Errors
///
/// Returns [`CapabilityError::Aborted`] on cancellation, or the operation's
/// own error.
pub async fn race_abort<T, F>(
    capability: &'static str,
    abort: Option<&AbortToken>,
    operation: F,
) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    let Some(token) = abort else {
        return operation.await;
    };
    if token.is_aborted() {
        return Err(CapabilityError::aborted(capability));
    }
    let aborted = token.aborted();
    futures::pin_mut!(aborted);
    futures::pin_mut!(operation);
    match select(aborted, operation).await {
        Either::Left(((), _)) => Err(CapabilityError::aborted(capability)),
        Either::Right((result, _)) => result,
    }
}
