//! Derived read-only views over a [`PullPort`].
//!
//! A [`MappedPull<U>`] wraps a source pull port plus a transform. Reading it
//! reads the source and applies the transform; subscribing to it subscribes
//! to the source, so listeners fire exactly when the source notifies.
//!
//! # Invariants
//!
//! 1. `read()` always reflects the source's current value (no caching).
//! 2. The transform runs on every `read()`, never during notification.
//! 3. Clones share the same source and transform.

use std::fmt;
use std::rc::Rc;

use crate::port::PullPort;
use crate::subscription::{Listener, Subscription};

/// A [`PullPort<U>`] derived from another pull port by a transform.
pub struct MappedPull<U> {
    eval: Rc<dyn Fn() -> U>,
    attach: Rc<dyn Fn(Listener) -> Subscription>,
}

impl<U> Clone for MappedPull<U> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
            attach: Rc::clone(&self.attach),
        }
    }
}

impl<U: 'static> MappedPull<U> {
    pub fn new<T, P, F>(source: P, map: F) -> Self
    where
        T: 'static,
        P: PullPort<T> + 'static,
        F: Fn(T) -> U + 'static,
    {
        let source = Rc::new(source);
        let reader = Rc::clone(&source);
        Self {
            eval: Rc::new(move || map(reader.read())),
            attach: Rc::new(move |listener: Listener| source.subscribe_listener(listener)),
        }
    }

    /// Apply a further transform, returning a new view.
    pub fn then<V: 'static>(self, f: impl Fn(U) -> V + 'static) -> MappedPull<V> {
        let eval = self.eval;
        MappedPull {
            eval: Rc::new(move || f(eval())),
            attach: self.attach,
        }
    }
}

impl<U> PullPort<U> for MappedPull<U> {
    fn read(&self) -> U {
        (self.eval)()
    }

    fn subscribe_listener(&self, listener: Listener) -> Subscription {
        (self.attach)(listener)
    }
}

impl<U: fmt::Debug> fmt::Debug for MappedPull<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedPull")
            .field("value", &(self.eval)())
            .finish()
    }
}
