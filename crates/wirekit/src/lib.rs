#![forbid(unsafe_code)]

//! wirekit: typed ports and fan-out connectors for wiring UI graphs.
//!
//! This crate re-exports [`wirekit_core`] and, with the default `widgets`
//! feature, the headless components of `wirekit_widgets`.
//!
//! ```
//! use wirekit::prelude::*;
//!
//! let enabled = Connector::<bool>::named("enabled");
//! let seen = std::rc::Rc::new(std::cell::Cell::new(false));
//! let s = seen.clone();
//! enabled.fan_out(port_fn(move |v| s.set(v)));
//! enabled.push(true).unwrap();
//! assert!(seen.get());
//! ```

pub use wirekit_core::*;

#[cfg(feature = "widgets")]
pub use wirekit_widgets as widgets;

pub mod prelude {
    //! Everything needed to wire a graph by hand.

    pub use wirekit_core::{
        Connector, DynPushPort, FlowError, PullPort, PushPort, Subscription, Value, ValueKind,
        WiringGraph, WiringScope, port_fn, try_port_fn,
    };

    #[cfg(feature = "graph-config")]
    pub use wirekit_core::GraphConfig;

    #[cfg(feature = "widgets")]
    pub use wirekit_widgets::{Component, MenuItem, Rgb, TextLabel};
}
