//! Change notification and re-evaluating queries
//!
//! Stores own a [`ChangeNotifier`]. Every committed write calls
//! [`ChangeNotifier::notify`], which wakes all subscribers. A [`LiveQuery`]
//! pairs one subscription with a fetch closure: it yields the current result
//! once, then a fresh result after every change.
//!
//! Bursts of notifications are coalesced. A query that falls behind re-runs
//! once for everything it missed, not once per write.

use crate::error::Result;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Fan-out of "something changed" signals to any number of subscribers
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<()>>>,
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Signal all live subscribers; disconnected ones are dropped
    pub fn notify(&self) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(()).is_ok());
    }

    /// Number of subscribers still connected as of the last notify
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Outcome of waiting on a [`LiveQuery`]
#[derive(Debug)]
pub enum Poll<T> {
    /// The query produced a value
    Ready(Result<T>),
    /// Nothing changed within the timeout
    Pending,
    /// The source was dropped; no further values will arrive
    Closed,
}

type Fetch<T> = Box<dyn Fn() -> Result<T> + Send>;

/// A query that is re-evaluated whenever its source changes
pub struct LiveQuery<T> {
    changes: Receiver<()>,
    fetch: Fetch<T>,
    emitted_initial: bool,
}

impl<T> std::fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("emitted_initial", &self.emitted_initial)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> LiveQuery<T> {
    /// Build a query from a change subscription and a fetch closure
    pub fn new(changes: Receiver<()>, fetch: impl Fn() -> Result<T> + Send + 'static) -> Self {
        Self {
            changes,
            fetch: Box::new(fetch),
            emitted_initial: false,
        }
    }

    /// Run the fetch now, without touching the subscription
    pub fn current(&self) -> Result<T> {
        (self.fetch)()
    }

    /// Transform every emitted value
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + Send + 'static) -> LiveQuery<U> {
        let fetch = self.fetch;
        LiveQuery {
            changes: self.changes,
            fetch: Box::new(move || fetch().map(&f)),
            emitted_initial: self.emitted_initial,
        }
    }

    /// Transform every emitted value with a fallible function
    pub fn and_then<U: 'static>(
        self,
        f: impl Fn(T) -> Result<U> + Send + 'static,
    ) -> LiveQuery<U> {
        let fetch = self.fetch;
        LiveQuery {
            changes: self.changes,
            fetch: Box::new(move || fetch().and_then(&f)),
            emitted_initial: self.emitted_initial,
        }
    }

    /// Block until the next value
    ///
    /// The first call returns immediately with the current result. Returns
    /// `None` once the source has been dropped.
    pub fn next(&mut self) -> Option<Result<T>> {
        if !self.emitted_initial {
            self.emitted_initial = true;
            return Some(self.current());
        }
        self.changes.recv().ok()?;
        self.drain();
        Some(self.current())
    }

    /// Wait at most `timeout` for the next value
    pub fn next_timeout(&mut self, timeout: Duration) -> Poll<T> {
        if !self.emitted_initial {
            self.emitted_initial = true;
            return Poll::Ready(self.current());
        }
        match self.changes.recv_timeout(timeout) {
            Ok(()) => {
                self.drain();
                Poll::Ready(self.current())
            }
            Err(RecvTimeoutError::Timeout) => Poll::Pending,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }

    /// Return a value only if a change is already pending
    pub fn try_next(&mut self) -> Poll<T> {
        if !self.emitted_initial {
            self.emitted_initial = true;
            return Poll::Ready(self.current());
        }
        match self.changes.try_recv() {
            Ok(()) => {
                self.drain();
                Poll::Ready(self.current())
            }
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Closed,
        }
    }

    fn drain(&self) {
        while self.changes.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn first_next_returns_current_value() {
        let notifier = ChangeNotifier::new();
        let mut query = LiveQuery::new(notifier.subscribe(), || Ok(42));
        assert_eq!(query.next().unwrap().unwrap(), 42);
    }

    #[test]
    fn notify_triggers_refetch() {
        let notifier = ChangeNotifier::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let fetch_counter = Arc::clone(&counter);
        let mut query = LiveQuery::new(notifier.subscribe(), move || {
            Ok(fetch_counter.fetch_add(1, Ordering::SeqCst))
        });

        assert_eq!(query.next().unwrap().unwrap(), 0);
        assert!(matches!(query.try_next(), Poll::Pending));

        notifier.notify();
        match query.try_next() {
            Poll::Ready(value) => assert_eq!(value.unwrap(), 1),
            other => panic!("expected a value, got {other:?}"),
        }
    }

    #[test]
    fn bursts_are_coalesced() {
        let notifier = ChangeNotifier::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let fetch_counter = Arc::clone(&counter);
        let mut query = LiveQuery::new(notifier.subscribe(), move || {
            Ok(fetch_counter.fetch_add(1, Ordering::SeqCst))
        });
        let _ = query.next();

        for _ in 0..5 {
            notifier.notify();
        }
        assert!(matches!(query.try_next(), Poll::Ready(Ok(1))));
        assert!(matches!(query.try_next(), Poll::Pending));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn closed_when_notifier_dropped() {
        let notifier = ChangeNotifier::new();
        let mut query = LiveQuery::new(notifier.subscribe(), || Ok(()));
        let _ = query.next();
        drop(notifier);
        assert!(matches!(
            query.next_timeout(Duration::from_millis(10)),
            Poll::Closed
        ));
        assert!(query.next().is_none());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let rx = notifier.subscribe();
        let _keep = notifier.subscribe();
        drop(rx);
        notifier.notify();
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn map_transforms_values() {
        let notifier = ChangeNotifier::new();
        let mut query = LiveQuery::new(notifier.subscribe(), || Ok(vec![1, 2, 3])).map(|v| v.len());
        assert_eq!(query.next().unwrap().unwrap(), 3);
    }
}
