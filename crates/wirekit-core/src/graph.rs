//! Name-addressed wiring graphs.
//!
//! [`WiringGraph`] assembles connectors and externally supplied sinks by
//! name, the way a configuration file or a visual editor describes them.
//! Node kinds are checked when an edge is wired, so a graph that wires
//! successfully never raises a type mismatch while propagating.
//!
//! Cycles are not rejected: a connector wired back into itself recurses on
//! every push, exactly as it would when wired by hand.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::debug;

use crate::connector::Connector;
use crate::error::{FlowError, Result};
use crate::port::PullPort;
use crate::subscription::{Listener, Subscription, fallible, infallible};
use crate::value::{DynPushPort, FlowValue, TypedSink, Value, ValueKind};

/// Object-safe view of a `Connector<T>` for some [`FlowValue`] `T`.
trait DynConnector {
    fn value_kind(&self) -> ValueKind;
    fn read_value(&self) -> Value;
    fn wire_fan_out(&self, sink: Rc<dyn DynPushPort>) -> Result<()>;
    fn wire_last(&self, sink: Rc<dyn DynPushPort>) -> Result<()>;
    fn listen(&self, listener: Listener) -> Subscription;
    fn assigned(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: FlowValue> DynConnector for Connector<T> {
    fn value_kind(&self) -> ValueKind {
        T::KIND
    }

    fn read_value(&self) -> Value {
        self.read().into_value()
    }

    fn wire_fan_out(&self, sink: Rc<dyn DynPushPort>) -> Result<()> {
        self.fan_out(TypedSink::<T>::new(sink)?);
        Ok(())
    }

    fn wire_last(&self, sink: Rc<dyn DynPushPort>) -> Result<()> {
        self.set_last(TypedSink::<T>::new(sink)?)
    }

    fn listen(&self, listener: Listener) -> Subscription {
        PullPort::subscribe_listener(self, listener)
    }

    fn assigned(&self) -> bool {
        self.is_assigned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

enum Node {
    Connector {
        hub: Rc<dyn DynConnector>,
        port: Rc<dyn DynPushPort>,
    },
    Sink(Rc<dyn DynPushPort>),
}

impl Node {
    fn port(&self) -> Rc<dyn DynPushPort> {
        match self {
            Self::Connector { port, .. } => Rc::clone(port),
            Self::Sink(port) => Rc::clone(port),
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            Self::Connector { hub, .. } => hub.value_kind(),
            Self::Sink(port) => port.kind(),
        }
    }
}

/// A registry of named connectors and sinks plus the edges between them.
#[derive(Default)]
pub struct WiringGraph {
    nodes: AHashMap<String, Node>,
    order: Vec<String>,
}

impl WiringGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector of the given kind under `name`.
    pub fn add_connector(&mut self, name: &str, kind: ValueKind) -> Result<()> {
        match kind {
            ValueKind::Unit => self.insert_connector(Connector::<()>::named(name)),
            ValueKind::Bool => self.insert_connector(Connector::<bool>::named(name)),
            ValueKind::Int => self.insert_connector(Connector::<i64>::named(name)),
            ValueKind::Float => self.insert_connector(Connector::<f64>::named(name)),
            ValueKind::Text => self.insert_connector(Connector::<String>::named(name)),
        }
    }

    /// Register an existing typed connector under its own name.
    pub fn insert_connector<T: FlowValue>(&mut self, connector: Connector<T>) -> Result<()> {
        let name = connector.name().to_owned();
        let node = Node::Connector {
            hub: Rc::new(connector.clone()),
            port: Rc::new(connector),
        };
        self.insert(name, node)
    }

    /// Register an external sink (a component input port) under `name`.
    pub fn add_sink(&mut self, name: &str, sink: Rc<dyn DynPushPort>) -> Result<()> {
        self.insert(name.to_owned(), Node::Sink(sink))
    }

    fn insert(&mut self, name: String, node: Node) -> Result<()> {
        if self.nodes.contains_key(&name) {
            return Err(FlowError::DuplicateName(name));
        }
        debug!(node = %name, kind = %node.kind(), "graph node added");
        self.order.push(name.clone());
        self.nodes.insert(name, node);
        Ok(())
    }

    fn node(&self, name: &str) -> Result<&Node> {
        self.nodes
            .get(name)
            .ok_or_else(|| FlowError::UnknownNode(name.to_owned()))
    }

    fn hub(&self, name: &str) -> Result<&Rc<dyn DynConnector>> {
        match self.node(name)? {
            Node::Connector { hub, .. } => Ok(hub),
            Node::Sink(_) => Err(FlowError::NotAConnector(name.to_owned())),
        }
    }

    fn edge(&self, from: &str, to: &str) -> Result<(&Rc<dyn DynConnector>, Rc<dyn DynPushPort>)> {
        let hub = self.hub(from)?;
        let target = self.node(to)?;
        if target.kind() != hub.value_kind() {
            return Err(FlowError::TypeMismatch {
                port: to.to_owned(),
                expected: target.kind(),
                found: hub.value_kind(),
            });
        }
        Ok((hub, target.port()))
    }

    /// Append `to` to the fan-out registry of connector `from`.
    pub fn wire(&mut self, from: &str, to: &str) -> Result<()> {
        let (hub, port) = self.edge(from, to)?;
        hub.wire_fan_out(port)?;
        debug!(from, to, "wired fan-out");
        Ok(())
    }

    /// Designate `to` as the last port of connector `from`.
    pub fn wire_last(&mut self, from: &str, to: &str) -> Result<()> {
        let (hub, port) = self.edge(from, to)?;
        hub.wire_last(port)?;
        debug!(from, to, "wired last");
        Ok(())
    }

    /// Push `value` into the named node.
    pub fn push(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.node(name)?.port().push_value(value.into())
    }

    /// Read the current value of the named connector.
    pub fn read(&self, name: &str) -> Result<Value> {
        Ok(self.hub(name)?.read_value())
    }

    /// Whether the named connector has received a value yet.
    pub fn is_assigned(&self, name: &str) -> Result<bool> {
        Ok(self.hub(name)?.assigned())
    }

    /// Listen for changes of the named connector.
    pub fn subscribe(&self, name: &str, listener: impl Fn() + 'static) -> Result<Subscription> {
        Ok(self.hub(name)?.listen(infallible(listener)))
    }

    /// Listen with a fallible listener.
    pub fn try_subscribe(
        &self,
        name: &str,
        listener: impl Fn() -> Result<()> + 'static,
    ) -> Result<Subscription> {
        Ok(self.hub(name)?.listen(fallible(listener)))
    }

    /// Typed handle to a connector, for wiring typed components to it.
    ///
    /// Returns `None` when the node is missing, is a sink, or holds a
    /// different type.
    #[must_use]
    pub fn connector<T: FlowValue>(&self, name: &str) -> Option<Connector<T>> {
        self.hub(name)
            .ok()
            .and_then(|hub| hub.as_any().downcast_ref::<Connector<T>>())
            .cloned()
    }

    /// Kind of the named node.
    pub fn kind(&self, name: &str) -> Result<ValueKind> {
        Ok(self.node(name)?.kind())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Connector names in insertion order.
    pub fn connector_names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|name| matches!(self.nodes.get(name.as_str()), Some(Node::Connector { .. })))
            .map(String::as_str)
    }

    /// Number of nodes, connectors and sinks together.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for WiringGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in &self.order {
            if let Some(node) = self.nodes.get(name) {
                let role = match node {
                    Node::Connector { .. } => "connector",
                    Node::Sink(_) => "sink",
                };
                map.entry(name, &format_args!("{role}<{}>", node.kind()));
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::value::ValueSink;

    fn recording_sink(name: &str, kind: ValueKind, log: &Rc<RefCell<Vec<String>>>) -> Rc<dyn DynPushPort> {
        let log = Rc::clone(log);
        let tag = name.to_owned();
        Rc::new(ValueSink::new(name, kind, move |v| {
            log.borrow_mut().push(format!("{tag}={v}"));
            Ok(())
        }))
    }

    #[test]
    fn wires_and_propagates_by_name() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_connector("visible", ValueKind::Bool).unwrap();
        g.add_sink("menu", recording_sink("menu", ValueKind::Bool, &log)).unwrap();
        g.add_sink("label", recording_sink("label", ValueKind::Bool, &log)).unwrap();
        g.add_sink("audit", recording_sink("audit", ValueKind::Bool, &log)).unwrap();
        g.wire("visible", "menu").unwrap();
        g.wire("visible", "label").unwrap();
        g.wire_last("visible", "audit").unwrap();

        g.push("visible", true).unwrap();
        assert_eq!(*log.borrow(), vec!["menu=true", "label=true", "audit=true"]);
        assert_eq!(g.read("visible").unwrap(), Value::Bool(true));
    }

    #[test]
    fn wiring_rejects_kind_mismatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_connector("title", ValueKind::Text).unwrap();
        g.add_sink("visible", recording_sink("visible", ValueKind::Bool, &log)).unwrap();

        let err = g.wire("title", "visible").unwrap_err();
        assert!(matches!(
            err,
            FlowError::TypeMismatch {
                expected: ValueKind::Bool,
                found: ValueKind::Text,
                ..
            }
        ));
    }

    #[test]
    fn push_rejects_wrong_value_kind() {
        let mut g = WiringGraph::new();
        g.add_connector("count", ValueKind::Int).unwrap();
        assert!(matches!(
            g.push("count", "three"),
            Err(FlowError::TypeMismatch { .. })
        ));
        assert!(!g.is_assigned("count").unwrap());
    }

    #[test]
    fn names_are_unique_and_resolved() {
        let mut g = WiringGraph::new();
        g.add_connector("a", ValueKind::Int).unwrap();
        assert!(matches!(
            g.add_connector("a", ValueKind::Bool),
            Err(FlowError::DuplicateName(_))
        ));
        assert!(matches!(g.wire("a", "missing"), Err(FlowError::UnknownNode(_))));
        assert!(matches!(g.read("missing"), Err(FlowError::UnknownNode(_))));
    }

    #[test]
    fn sinks_cannot_be_read() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_sink("out", recording_sink("out", ValueKind::Int, &log)).unwrap();
        assert!(matches!(g.read("out"), Err(FlowError::NotAConnector(_))));
        assert!(g.subscribe("out", || {}).is_err());
        g.push("out", 4_i64).unwrap();
        assert_eq!(*log.borrow(), vec!["out=4"]);
    }

    #[test]
    fn sinks_cannot_source_edges_or_report_assignment() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_connector("conn", ValueKind::Bool).unwrap();
        g.add_sink("sink", recording_sink("sink", ValueKind::Bool, &log)).unwrap();
        assert!(matches!(g.wire("sink", "conn"), Err(FlowError::NotAConnector(ref n)) if n == "sink"));
        assert!(matches!(g.wire_last("sink", "conn"), Err(FlowError::NotAConnector(_))));
        assert!(matches!(g.is_assigned("sink"), Err(FlowError::NotAConnector(_))));
        assert!(matches!(
            g.try_subscribe("sink", || Ok(())),
            Err(FlowError::NotAConnector(_))
        ));
    }

    #[test]
    fn failing_listener_fails_push_before_last() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_connector("open", ValueKind::Bool).unwrap();
        g.add_sink("menu", recording_sink("menu", ValueKind::Bool, &log)).unwrap();
        g.add_sink("audit", recording_sink("audit", ValueKind::Bool, &log)).unwrap();
        g.wire("open", "menu").unwrap();
        g.wire_last("open", "audit").unwrap();
        let _sub = g
            .try_subscribe("open", || Err(FlowError::reaction("watcher", "refused")))
            .unwrap();

        let err = g.push("open", true).unwrap_err();
        assert!(err.is_reaction());
        assert_eq!(*log.borrow(), vec!["menu=true"]);
        assert_eq!(g.read("open").unwrap(), Value::Bool(true));
    }

    #[test]
    fn connectors_chain() {
        let mut g = WiringGraph::new();
        g.add_connector("src", ValueKind::Float).unwrap();
        g.add_connector("mid", ValueKind::Float).unwrap();
        g.wire_last("src", "mid").unwrap();
        assert!(matches!(
            g.wire_last("src", "mid"),
            Err(FlowError::LastAlreadyWired { .. })
        ));

        g.push("src", 1.5).unwrap();
        assert_eq!(g.read("mid").unwrap(), Value::Float(1.5));
    }

    #[test]
    fn typed_handle_round_trips() {
        let mut g = WiringGraph::new();
        g.insert_connector(Connector::<String>::named("status")).unwrap();
        assert!(g.connector::<bool>("status").is_none());

        let status = g.connector::<String>("status").unwrap();
        status.push("ready".into()).unwrap();
        assert_eq!(g.read("status").unwrap(), Value::Text("ready".into()));
    }

    #[test]
    fn subscribe_by_name() {
        let mut g = WiringGraph::new();
        g.add_connector("n", ValueKind::Int).unwrap();
        let hits = Rc::new(std::cell::Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = g.subscribe("n", move || h.set(h.get() + 1)).unwrap();
        g.push("n", 1_i64).unwrap();
        drop(sub);
        g.push("n", 2_i64).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn connector_names_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut g = WiringGraph::new();
        g.add_connector("b", ValueKind::Unit).unwrap();
        g.add_sink("s", recording_sink("s", ValueKind::Unit, &log)).unwrap();
        g.add_connector("a", ValueKind::Unit).unwrap();
        assert_eq!(g.connector_names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(g.len(), 3);
        assert_eq!(format!("{g:?}"), r#"{"b": connector<unit>, "s": sink<unit>, "a": connector<unit>}"#);
    }
}
