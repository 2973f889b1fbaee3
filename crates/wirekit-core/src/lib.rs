#![forbid(unsafe_code)]

//! Typed dataflow wiring for wirekit.
//!
//! Components exchange single values through two port capabilities:
//!
//! - [`PushPort<T>`]: a sink that reacts synchronously to an assigned value.
//! - [`PullPort<T>`]: a source that can be read on demand and notifies
//!   listeners, without payload, when its value changes.
//!
//! A [`Connector<T>`] implements both. It stores the value, fans it out to
//! its sinks in wiring order, notifies its listeners and finally delivers to
//! its designated last sink.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous: ports are `Rc`/`RefCell`
//! based and `!Send`. A push is a plain call chain that runs to completion
//! before returning; there is no scheduler, queue or deferral anywhere.
//!
//! [`WiringGraph`] assembles connectors and [`DynPushPort`] sinks by name for
//! graphs whose shape is only known at runtime. With the `graph-config`
//! feature the graph can be loaded from a TOML file.
//!
//! # Invariants
//!
//! 1. A connector's value always equals the most recently pushed value.
//! 2. Fan-out delivery order is wiring order; duplicates deliver twice.
//! 3. Notification happens after all fan-out deliveries and before the last
//!    delivery.
//! 4. Reads never observe a value older than the last completed push.
//! 5. A failing reaction stops its propagation; nothing is rolled back.

pub mod connector;
pub mod error;
pub mod graph;
pub mod mapped;
pub mod port;
pub mod scope;
pub mod subscription;
pub mod value;

#[cfg(feature = "graph-config")]
pub mod config;

pub use connector::{Connector, DEFAULT_INSTANCE_NAME};
pub use error::{FlowError, Result};
pub use graph::WiringGraph;
pub use mapped::MappedPull;
pub use port::{FnPort, PullPort, PushPort, port_fn, try_port_fn};
pub use scope::WiringScope;
pub use subscription::{Listener, Subscription};
pub use value::{
    DynPushPort, FlowValue, PortSink, TypedSink, Value, ValueKind, ValueSink, dyn_sink, expect_kind,
};

#[cfg(feature = "graph-config")]
pub use config::{ConnectorConfig, GraphConfig};
