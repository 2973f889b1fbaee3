//! Lifetime management for the listeners a component registers.
//!
//! A component that observes several pull ports keeps its [`Subscription`]s
//! in a [`WiringScope`]. Dropping the scope (or calling [`WiringScope::clear`])
//! detaches every listener at once.
//!
//! ```
//! use wirekit_core::{Connector, WiringScope};
//!
//! let enabled = Connector::<bool>::new();
//! let mut scope = WiringScope::new();
//! scope.on_change(&enabled, || println!("enabled changed"));
//! assert_eq!(scope.len(), 1);
//! drop(scope);
//! assert_eq!(enabled.listener_count(), 0);
//! ```

use std::fmt;

use crate::error::Result;
use crate::port::PullPort;
use crate::subscription::Subscription;

/// Collects subscriptions for one logical owner.
#[derive(Default)]
pub struct WiringScope {
    subscriptions: Vec<Subscription>,
}

impl WiringScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive until the scope is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) -> &mut Self {
        self.subscriptions.push(sub);
        self
    }

    /// Subscribe to `source` and hold the subscription.
    pub fn on_change<T, P>(&mut self, source: &P, listener: impl Fn() + 'static) -> &mut Self
    where
        P: PullPort<T>,
    {
        let sub = source.on_change(listener);
        self.hold(sub)
    }

    /// Subscribe a fallible listener to `source` and hold the subscription.
    pub fn try_on_change<T, P>(
        &mut self,
        source: &P,
        listener: impl Fn() -> Result<()> + 'static,
    ) -> &mut Self
    where
        P: PullPort<T>,
    {
        let sub = source.try_on_change(listener);
        self.hold(sub)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now; the scope stays usable.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl fmt::Debug for WiringScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WiringScope")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
