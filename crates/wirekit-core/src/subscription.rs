//! Change-notification listeners and their RAII guards.
//!
//! A [`ListenerList`] stores listeners as `Weak` function pointers; the
//! matching strong reference lives in the [`Subscription`] handed back to the
//! subscriber. Dropping the guard (or calling [`Subscription::unsubscribe`])
//! therefore detaches the listener without touching the source.
//!
//! # Invariants
//!
//! 1. Listeners are invoked in registration order.
//! 2. Subscribing or unsubscribing never triggers a notification.
//! 3. A listener unsubscribed by an earlier listener of the same notification
//!    cycle is not invoked.
//! 4. A listener subscribed during a notification cycle is first invoked on
//!    the next cycle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;

/// Payload-less change listener. Listeners re-read the source to learn the
/// new value.
pub type Listener = Rc<dyn Fn() -> Result<()>>;

/// Wrap an infallible callback as a [`Listener`].
pub(crate) fn infallible(callback: impl Fn() + 'static) -> Listener {
    fallible(move || {
        callback();
        Ok(())
    })
}

pub(crate) fn fallible(callback: impl Fn() -> Result<()> + 'static) -> Listener {
    Rc::new(callback)
}

/// Ordered, instance-scoped set of change listeners.
#[derive(Default)]
pub(crate) struct ListenerList {
    entries: RefCell<Vec<Weak<dyn Fn() -> Result<()>>>>,
}

impl ListenerList {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn add(self: &Rc<Self>, listener: Listener) -> Subscription {
        self.entries.borrow_mut().push(Rc::downgrade(&listener));
        Subscription {
            listener: Some(listener),
            source: Rc::downgrade(self),
        }
    }

    /// Invoke every live listener in registration order.
    ///
    /// Iterates a snapshot so listeners may subscribe or unsubscribe while the
    /// cycle runs. The first error stops the cycle and is returned.
    pub(crate) fn notify(&self) -> Result<()> {
        let snapshot = self.entries.borrow().clone();
        let mut stale = false;
        for weak in &snapshot {
            match weak.upgrade() {
                Some(listener) => listener()?,
                None => stale = true,
            }
        }
        if stale {
            self.prune();
        }
        Ok(())
    }

    /// Number of listeners whose subscription is still held.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn prune(&self) {
        if let Ok(mut entries) = self.entries.try_borrow_mut() {
            entries.retain(|w| w.strong_count() > 0);
        }
    }
}

impl fmt::Debug for ListenerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("listeners", &self.len())
            .finish()
    }
}

/// RAII guard for a change listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    listener: Option<Listener>,
    source: Weak<ListenerList>,
}

impl Subscription {
    /// Detach the listener now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}

    /// Whether the source this listener is attached to still exists.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.listener.is_some() && self.source.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listener = None;
        if let Some(source) = self.source.upgrade() {
            source.prune();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::error::FlowError;

    fn counter(list: &Rc<ListenerList>, hits: &Rc<Cell<u32>>) -> Subscription {
        let h = Rc::clone(hits);
        list.add(fallible(move || {
            h.set(h.get() + 1);
            Ok(())
        }))
    }

    #[test]
    fn notifies_in_registration_order() {
        let list = ListenerList::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let o = Rc::clone(&order);
                list.add(fallible(move || {
                    o.borrow_mut().push(i);
                    Ok(())
                }))
            })
            .collect();

        list.notify().unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn drop_unsubscribes() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let sub = counter(&list, &hits);
        assert_eq!(list.len(), 1);

        list.notify().unwrap();
        drop(sub);
        assert_eq!(list.len(), 0);
        list.notify().unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn explicit_unsubscribe() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let sub = counter(&list, &hits);
        sub.unsubscribe();
        list.notify().unwrap();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn listener_dropped_mid_cycle_is_skipped() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = list.add(fallible(move || {
            v.borrow_mut().take();
            Ok(())
        }));
        *victim.borrow_mut() = Some(counter(&list, &hits));

        list.notify().unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn listener_added_mid_cycle_waits_for_next_cycle() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let late: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let l = Rc::clone(&late);
        let weak_list = Rc::downgrade(&list);
        let h = Rc::clone(&hits);
        let _adder = list.add(fallible(move || {
            if l.borrow().is_some() {
                return Ok(());
            }
            if let Some(list) = weak_list.upgrade() {
                *l.borrow_mut() = Some(counter(&list, &h));
            }
            Ok(())
        }));

        list.notify().unwrap();
        assert_eq!(hits.get(), 0);
        list.notify().unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn error_stops_cycle() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let _failing = list.add(fallible(|| Err(FlowError::reaction("l0", "boom"))));
        let _counter = counter(&list, &hits);

        assert!(list.notify().is_err());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn subscription_inactive_after_source_dropped() {
        let list = ListenerList::new();
        let hits = Rc::new(Cell::new(0));
        let sub = counter(&list, &hits);
        assert!(sub.is_active());
        drop(list);
        assert!(!sub.is_active());
    }
}
