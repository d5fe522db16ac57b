//! Live queries over the store
//!
//! A [`LiveQuery`] is a subscription to one of the store's published query
//! results. The first read yields the state at subscription time; every read
//! after that waits for the next committed write. Values are latest-wins: a
//! subscriber that falls behind sees the newest state, never a backlog, and
//! writers never wait on readers.

use futures::Stream;
use tokio::sync::watch;

/// Subscription to a continuously re-evaluated query
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    primed: bool,
}

impl<T: Clone> LiveQuery<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx, primed: false }
    }

    /// Current value without waiting
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Next value of the query
    ///
    /// The first call returns immediately with the current state. Later
    /// calls resolve after the next committed write. Returns `None` once the
    /// store has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the query result satisfies `predicate`
    ///
    /// Checks the current value first. Returns `None` if the store is
    /// dropped before the predicate holds.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.primed = true;
        let value = self.rx.wait_for(predicate).await.ok()?;
        Some((*value).clone())
    }
}

impl<T> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Adapt into a `Stream` with the same first-value semantics
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        futures::stream::unfold(self, |mut query| async move {
            let value = query.next().await?;
            Some((value, query))
        })
    }
}

impl<T> Clone for LiveQuery<T> {
    /// A clone is a fresh subscription: it yields the current state first
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            primed: false,
        }
    }
}
