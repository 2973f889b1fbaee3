//! The fan-out/fan-in hub at the centre of every wiring graph.
//!
//! A [`Connector<T>`] holds one current value. Pushing into it runs three
//! phases, strictly in this order, before `push` returns:
//!
//! 1. the value slot is overwritten, then every fan-out sink receives the
//!    value in wiring order;
//! 2. change listeners are notified (they read the slot);
//! 3. the designated last sink, if any, receives the value.
//!
//! The order is a hard contract. Fan-out sinks are the primary consumers,
//! listeners are passive observers and the last sink sees a fully settled
//! graph, which is what makes chaining connectors through `last` safe.
//!
//! # Re-entrancy
//!
//! No borrow is held while a sink or listener runs, so a reaction may push
//! into any connector, including the one currently propagating. The nested
//! push runs to completion before the outer phase continues. Sinks and
//! listeners are iterated from a snapshot taken when their phase starts.
//!
//! # Failure Modes
//!
//! An `Err` from a sink or listener is returned unchanged. Deliveries already
//! made are kept; the remaining fan-out entries, the notification and the
//! last delivery of that push are skipped. The slot keeps the new value.
//!
//! # Ownership
//!
//! `Connector` is a cheap `Clone` handle over shared state (`Rc`). Wiring a
//! connector into another stores a strong handle, so cyclic wiring lives for
//! as long as the process; there is no teardown contract.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, trace};

use crate::error::{FlowError, Result};
use crate::port::{PullPort, PushPort};
use crate::subscription::{Listener, ListenerList, Subscription, fallible, infallible};
use crate::value::{DynPushPort, FlowValue, Value, ValueKind, expect_kind};

/// Name used for connectors created without one.
pub const DEFAULT_INSTANCE_NAME: &str = "Default";

type Sink<T> = Rc<dyn PushPort<T>>;

struct Hub<T> {
    name: String,
    slot: RefCell<T>,
    version: Cell<u64>,
    fan_out: RefCell<Vec<Sink<T>>>,
    last: RefCell<Option<Sink<T>>>,
    listeners: Rc<ListenerList>,
}

/// Single authoritative relay for one typed value.
pub struct Connector<T> {
    hub: Rc<Hub<T>>,
}

impl<T> Clone for Connector<T> {
    fn clone(&self) -> Self {
        Self {
            hub: Rc::clone(&self.hub),
        }
    }
}

impl<T: Clone + Default + 'static> Default for Connector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default + 'static> Connector<T> {
    /// Create an unnamed connector holding `T::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::named(DEFAULT_INSTANCE_NAME)
    }

    /// Create a connector with an instance name used in logs and errors.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            hub: Rc::new(Hub {
                name: name.into(),
                slot: RefCell::new(T::default()),
                version: Cell::new(0),
                fan_out: RefCell::new(Vec::new()),
                last: RefCell::new(None),
                listeners: ListenerList::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.hub.name
    }

    // -- wiring -------------------------------------------------------------

    /// Append `sink` to the fan-out registry.
    ///
    /// Delivery order is wiring order. Wiring the same component twice
    /// delivers to it twice.
    pub fn fan_out(&self, sink: impl PushPort<T> + 'static) -> &Self {
        self.hub.fan_out.borrow_mut().push(Rc::new(sink));
        trace!(
            connector = %self.hub.name,
            fan_out = self.fan_out_len(),
            "wired fan-out sink"
        );
        self
    }

    /// Designate the last sink, delivered after fan-out and notification.
    ///
    /// Fails with [`FlowError::LastAlreadyWired`] when one is already set;
    /// use [`replace_last`](Self::replace_last) to rewire deliberately.
    pub fn set_last(&self, sink: impl PushPort<T> + 'static) -> Result<()> {
        let mut last = self.hub.last.borrow_mut();
        if last.is_some() {
            return Err(FlowError::LastAlreadyWired {
                connector: self.hub.name.clone(),
            });
        }
        *last = Some(Rc::new(sink));
        trace!(connector = %self.hub.name, "wired last sink");
        Ok(())
    }

    /// Designate the last sink, returning the previous one.
    pub fn replace_last(&self, sink: impl PushPort<T> + 'static) -> Option<Rc<dyn PushPort<T>>> {
        self.hub.last.borrow_mut().replace(Rc::new(sink))
    }

    /// Remove the last sink, returning it.
    pub fn clear_last(&self) -> Option<Rc<dyn PushPort<T>>> {
        self.hub.last.borrow_mut().take()
    }

    // -- propagation --------------------------------------------------------

    /// Store `value` and propagate it: fan-out, notification, last.
    pub fn push(&self, value: T) -> Result<()> {
        let span = debug_span!(
            "connector_push",
            connector = %self.hub.name,
            version = tracing::field::Empty
        );
        let _guard = span.enter();

        *self.hub.slot.borrow_mut() = value.clone();
        let version = self.hub.version.get() + 1;
        self.hub.version.set(version);
        span.record("version", version);

        let fan_out = self.hub.fan_out.borrow().clone();
        for (index, sink) in fan_out.iter().enumerate() {
            trace!(index, "fan-out delivery");
            if let Err(err) = sink.push(value.clone()) {
                debug!(index, error = %err, "fan-out delivery failed");
                return Err(err);
            }
        }

        trace!(listeners = self.hub.listeners.len(), "notify");
        if let Err(err) = self.hub.listeners.notify() {
            debug!(error = %err, "change listener failed");
            return Err(err);
        }

        let last = self.hub.last.borrow().clone();
        if let Some(last) = last {
            trace!("last delivery");
            if let Err(err) = last.push(value) {
                debug!(error = %err, "last delivery failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// The value of the most recent push, or `T::default()` before any push.
    #[must_use]
    pub fn read(&self) -> T {
        self.hub.slot.borrow().clone()
    }

    // -- notification -------------------------------------------------------

    /// Register a change listener; dropping the guard unsubscribes.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        self.hub.listeners.add(infallible(listener))
    }

    /// Register a listener whose error aborts the propagation before the
    /// last delivery.
    pub fn try_subscribe(&self, listener: impl Fn() -> Result<()> + 'static) -> Subscription {
        self.hub.listeners.add(fallible(listener))
    }

    // -- introspection ------------------------------------------------------

    /// Number of fan-out entries, duplicates included.
    #[must_use]
    pub fn fan_out_len(&self) -> usize {
        self.hub.fan_out.borrow().len()
    }

    #[must_use]
    pub fn has_last(&self) -> bool {
        self.hub.last.borrow().is_some()
    }

    /// Number of live change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.hub.listeners.len()
    }

    /// Whether any value has been pushed yet.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.hub.version.get() > 0
    }

    /// Number of pushes stored so far. Equal values count too.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.hub.version.get()
    }

    /// Whether two handles share the same hub.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.hub, &other.hub)
    }
}

impl<T: Clone + Default + 'static> PushPort<T> for Connector<T> {
    fn push(&self, value: T) -> Result<()> {
        Connector::push(self, value)
    }
}

impl<T: Clone + Default + 'static> PullPort<T> for Connector<T> {
    fn read(&self) -> T {
        Connector::read(self)
    }

    fn subscribe_listener(&self, listener: Listener) -> Subscription {
        self.hub.listeners.add(listener)
    }
}

impl<T: FlowValue> DynPushPort for Connector<T> {
    fn port_name(&self) -> &str {
        &self.hub.name
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn push_value(&self, value: Value) -> Result<()> {
        let value = expect_kind::<T>(&self.hub.name, value)?;
        self.push(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Connector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Connector");
        s.field("name", &self.hub.name);
        match self.hub.slot.try_borrow() {
            Ok(value) => s.field("value", &*value),
            Err(_) => s.field("value", &"<borrowed>"),
        };
        s.field("version", &self.hub.version.get())
            .field("fan_out", &self.hub.fan_out.borrow().len())
            .field("has_last", &self.hub.last.borrow().is_some())
            .field("listeners", &self.hub.listeners.len())
            .finish()
    }
}
