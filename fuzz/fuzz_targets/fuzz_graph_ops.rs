#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wirekit_core::{FlowError, Value, ValueKind, ValueSink, WiringGraph};

const NODES: u8 = 8;

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Kind {
    Unit,
    Bool,
    Int,
    Text,
}

impl Kind {
    fn value_kind(self) -> ValueKind {
        match self {
            Kind::Unit => ValueKind::Unit,
            Kind::Bool => ValueKind::Bool,
            Kind::Int => ValueKind::Int,
            Kind::Text => ValueKind::Text,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Unit,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<FuzzValue> for Value {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Unit => Value::Unit,
            FuzzValue::Bool(b) => Value::Bool(b),
            FuzzValue::Int(n) => Value::Int(n),
            FuzzValue::Text(s) => Value::Text(s),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Op {
    AddConnector { id: u8, kind: Kind },
    AddSink { id: u8, kind: Kind, fail: bool },
    Wire { from: u8, to: u8 },
    WireLast { from: u8, to: u8 },
    Push { id: u8, value: FuzzValue },
    Read { id: u8 },
    Subscribe { id: u8 },
}

fn name(id: u8) -> String {
    format!("n{}", id % NODES)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut graph = WiringGraph::new();
    let mut subscriptions = Vec::new();
    let notified = Rc::new(Cell::new(0_u64));

    for op in ops.into_iter().take(256) {
        match op {
            Op::AddConnector { id, kind } => {
                let _ = graph.add_connector(&name(id), kind.value_kind());
            }
            Op::AddSink { id, kind, fail } => {
                let sink_name = name(id);
                let label = sink_name.clone();
                let sink = ValueSink::new(&sink_name, kind.value_kind(), move |_: Value| {
                    if fail {
                        Err(FlowError::reaction(label.clone(), "sink refused"))
                    } else {
                        Ok(())
                    }
                });
                let _ = graph.add_sink(&sink_name, Rc::new(sink));
            }
            // Edges only point to higher ids so pushes always terminate.
            Op::Wire { from, to } if from % NODES < to % NODES => {
                let _ = graph.wire(&name(from), &name(to));
            }
            Op::WireLast { from, to } if from % NODES < to % NODES => {
                let _ = graph.wire_last(&name(from), &name(to));
            }
            Op::Wire { .. } | Op::WireLast { .. } => {}
            Op::Push { id, value } => {
                let target = name(id);
                let value = Value::from(value);
                let kind = value.kind();
                let result = graph.push(&target, value.clone());
                match graph.kind(&target) {
                    Err(_) => assert!(matches!(result, Err(FlowError::UnknownNode(_)))),
                    Ok(expected) if expected != kind => {
                        assert!(matches!(result, Err(FlowError::TypeMismatch { .. })));
                    }
                    Ok(_) => {
                        // The slot keeps the pushed value even when a reaction failed.
                        if let Ok(stored) = graph.read(&target) {
                            assert_eq!(stored, value);
                            assert_eq!(graph.is_assigned(&target).ok(), Some(true));
                        }
                    }
                }
            }
            Op::Read { id } => {
                let _ = graph.read(&name(id));
            }
            Op::Subscribe { id } => {
                let count = Rc::clone(&notified);
                if let Ok(sub) = graph.subscribe(&name(id), move || count.set(count.get() + 1)) {
                    subscriptions.push(sub);
                }
            }
        }
    }
});
