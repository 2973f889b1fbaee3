//! The two port capabilities every wirekit component is built from.
//!
//! - [`PushPort<T>`]: write-only sink. A producer assigns a value and the
//!   component reacts before `push` returns.
//! - [`PullPort<T>`]: read-on-demand source with a payload-less change
//!   notification. Listeners re-read the port to learn the new value.
//!
//! Both are plain synchronous calls. There is no queue between a producer and
//! a sink, so a reaction that pushes further runs as a nested call.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use wirekit_core::{Connector, port_fn};
//!
//! let seen = Rc::new(Cell::new(0));
//! let s = Rc::clone(&seen);
//!
//! let count = Connector::<i64>::named("count");
//! count.fan_out(port_fn(move |v| s.set(v)));
//! count.push(3).unwrap();
//!
//! assert_eq!(seen.get(), 3);
//! assert_eq!(count.read(), 3);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::Result;
use crate::mapped::MappedPull;
use crate::subscription::{Listener, Subscription, fallible, infallible};

/// Write-only value sink (a component's input port).
///
/// `push` must fully process `value` before returning: no buffering, no
/// deferral and no partial application. An `Err` aborts the propagation that
/// delivered the value.
pub trait PushPort<T> {
    fn push(&self, value: T) -> Result<()>;
}

impl<T, P: PushPort<T> + ?Sized> PushPort<T> for Rc<P> {
    fn push(&self, value: T) -> Result<()> {
        (**self).push(value)
    }
}

impl<T, P: PushPort<T> + ?Sized> PushPort<T> for Box<P> {
    fn push(&self, value: T) -> Result<()> {
        (**self).push(value)
    }
}

impl<T, P: PushPort<T> + ?Sized> PushPort<T> for &P {
    fn push(&self, value: T) -> Result<()> {
        (**self).push(value)
    }
}

/// Read-on-demand value source with change notification.
pub trait PullPort<T> {
    /// Current value. Never has side effects.
    fn read(&self) -> T;

    /// Register a change listener. Registration itself never notifies.
    fn subscribe_listener(&self, listener: Listener) -> Subscription;

    /// Register an infallible change listener.
    fn on_change(&self, listener: impl Fn() + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.subscribe_listener(infallible(listener))
    }

    /// Register a listener whose failure aborts the notifying propagation.
    fn try_on_change(&self, listener: impl Fn() -> Result<()> + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.subscribe_listener(fallible(listener))
    }

    /// Derive a read-only view that applies `map` on every read.
    fn map<U: 'static, F>(self, map: F) -> MappedPull<U>
    where
        Self: Sized + 'static,
        T: 'static,
        F: Fn(T) -> U + 'static,
    {
        MappedPull::new(self, map)
    }
}

impl<T, P: PullPort<T> + ?Sized> PullPort<T> for Rc<P> {
    fn read(&self) -> T {
        (**self).read()
    }

    fn subscribe_listener(&self, listener: Listener) -> Subscription {
        (**self).subscribe_listener(listener)
    }
}

/// Closure-backed [`PushPort`].
///
/// Build one with [`port_fn`] (infallible reaction) or [`try_port_fn`].
pub struct FnPort<T, F> {
    react: F,
    _marker: PhantomData<fn(T)>,
}

impl<T, F> PushPort<T> for FnPort<T, F>
where
    F: Fn(T) -> Result<()>,
{
    fn push(&self, value: T) -> Result<()> {
        (self.react)(value)
    }
}

impl<T, F> fmt::Debug for FnPort<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPort").finish_non_exhaustive()
    }
}

/// Wrap an infallible closure as a [`PushPort`].
pub fn port_fn<T>(react: impl Fn(T)) -> FnPort<T, impl Fn(T) -> Result<()>> {
    FnPort {
        react: move |value: T| {
            react(value);
            Ok(())
        },
        _marker: PhantomData,
    }
}

/// Wrap a fallible closure as a [`PushPort`].
pub fn try_port_fn<T, F>(react: F) -> FnPort<T, F>
where
    F: Fn(T) -> Result<()>,
{
    FnPort {
        react,
        _marker: PhantomData,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::FlowError;

    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl PushPort<String> for Recorder {
        fn push(&self, value: String) -> Result<()> {
            self.seen.borrow_mut().push(value);
            Ok(())
        }
    }

    #[test]
    fn rc_and_ref_forward_to_component() {
        let rec = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        rec.push("a".to_string()).unwrap();
        (&*rec).push("b".to_string()).unwrap();
        let boxed: Box<dyn PushPort<String>> = Box::new(Rc::clone(&rec));
        boxed.push("c".to_string()).unwrap();
        assert_eq!(*rec.seen.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn port_fn_reacts_synchronously() {
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let port = port_fn(move |v: bool| *s.borrow_mut() = Some(v));
        port.push(true).unwrap();
        assert_eq!(*seen.borrow(), Some(true));
    }

    #[test]
    fn try_port_fn_propagates_failure() {
        let port = try_port_fn(|v: i64| {
            if v < 0 {
                Err(FlowError::reaction("positive", format!("negative input {v}")))
            } else {
                Ok(())
            }
        });
        assert!(port.push(1).is_ok());
        let err = port.push(-2).unwrap_err();
        assert!(err.to_string().contains("negative input -2"));
    }

    fn count_label<P: PullPort<i64> + 'static>(source: P) -> MappedPull<String> {
        source.map(|n| format!("{n} items"))
    }

    #[test]
    fn map_works_on_any_pull_source() {
        let count = crate::connector::Connector::<i64>::named("count");
        let label = count_label(Rc::new(count.clone()));
        assert_eq!(label.read(), "0 items");
        count.push(4).unwrap();
        assert_eq!(label.read(), "4 items");
    }
}
