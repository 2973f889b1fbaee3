//! Dynamically typed values and ports.
//!
//! Generic [`PushPort<T>`](crate::PushPort) wiring makes a type mismatch a
//! compile error. Graphs assembled from configuration only know port kinds at
//! runtime, so they exchange [`Value`]s through [`DynPushPort`] instead, and a
//! wrong kind fails immediately with [`FlowError::TypeMismatch`].

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{FlowError, Result};
use crate::port::PushPort;

/// The kind of a [`Value`], i.e. the declared type of a dynamic port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "graph-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "graph-config", serde(rename_all = "lowercase"))]
pub enum ValueKind {
    /// Payload-less event.
    Unit,
    Bool,
    Int,
    Float,
    Text,
}

impl ValueKind {
    /// Lowercase name, as used in graph configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single dynamically typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Unit => ValueKind::Unit,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

/// A Rust type that can travel through dynamic ports.
pub trait FlowValue: Clone + Default + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    /// Convert back, returning `None` when the kind differs.
    fn from_value(value: Value) -> Option<Self>;
}

impl FlowValue for () {
    const KIND: ValueKind = ValueKind::Unit;

    fn into_value(self) -> Value {
        Value::Unit
    }

    fn from_value(value: Value) -> Option<Self> {
        matches!(value, Value::Unit).then_some(())
    }
}

macro_rules! impl_flow_value {
    ($ty:ty, $variant:ident) => {
        impl FlowValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_flow_value!(bool, Bool);
impl_flow_value!(i64, Int);
impl_flow_value!(f64, Float);
impl_flow_value!(String, Text);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

/// Convert `value` to `T`, naming `port` in the mismatch error.
pub fn expect_kind<T: FlowValue>(port: &str, value: Value) -> Result<T> {
    let found = value.kind();
    T::from_value(value).ok_or_else(|| FlowError::TypeMismatch {
        port: port.to_owned(),
        expected: T::KIND,
        found,
    })
}

/// A Push Port whose value type is only known at runtime.
pub trait DynPushPort {
    /// Name used in error messages and log records.
    fn port_name(&self) -> &str;

    /// The only kind this port accepts.
    fn kind(&self) -> ValueKind;

    /// Deliver `value`, failing with [`FlowError::TypeMismatch`] before any
    /// reaction when its kind is wrong.
    fn push_value(&self, value: Value) -> Result<()>;
}

impl<P: DynPushPort + ?Sized> DynPushPort for Rc<P> {
    fn port_name(&self) -> &str {
        (**self).port_name()
    }

    fn kind(&self) -> ValueKind {
        (**self).kind()
    }

    fn push_value(&self, value: Value) -> Result<()> {
        (**self).push_value(value)
    }
}

/// Closure-backed [`DynPushPort`] for sinks registered in a wiring graph.
pub struct ValueSink<F> {
    name: String,
    kind: ValueKind,
    react: F,
}

impl<F> ValueSink<F>
where
    F: Fn(Value) -> Result<()>,
{
    pub fn new(name: impl Into<String>, kind: ValueKind, react: F) -> Self {
        Self {
            name: name.into(),
            kind,
            react,
        }
    }
}

impl<F> DynPushPort for ValueSink<F>
where
    F: Fn(Value) -> Result<()>,
{
    fn port_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn push_value(&self, value: Value) -> Result<()> {
        if value.kind() != self.kind {
            return Err(FlowError::TypeMismatch {
                port: self.name.clone(),
                expected: self.kind,
                found: value.kind(),
            });
        }
        (self.react)(value)
    }
}

impl<F> fmt::Debug for ValueSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSink")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Exposes a typed [`PushPort<T>`] as a named [`DynPushPort`].
///
/// This is how typed components join a [`WiringGraph`](crate::WiringGraph).
pub struct PortSink<T, P> {
    name: String,
    port: P,
    _marker: PhantomData<fn(T)>,
}

impl<T: FlowValue, P: PushPort<T>> PortSink<T, P> {
    pub fn new(name: impl Into<String>, port: P) -> Self {
        Self {
            name: name.into(),
            port,
            _marker: PhantomData,
        }
    }
}

impl<T: FlowValue, P: PushPort<T>> DynPushPort for PortSink<T, P> {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn push_value(&self, value: Value) -> Result<()> {
        let value = expect_kind::<T>(&self.name, value)?;
        self.port.push(value)
    }
}

/// Wrap `port` as a shared dynamic sink named `name`.
pub fn dyn_sink<T, P>(name: impl Into<String>, port: P) -> Rc<dyn DynPushPort>
where
    T: FlowValue,
    P: PushPort<T> + 'static,
{
    Rc::new(PortSink::<T, P>::new(name, port))
}

/// Adapts a [`DynPushPort`] to a typed [`PushPort<T>`].
pub struct TypedSink<T> {
    inner: Rc<dyn DynPushPort>,
    _marker: PhantomData<fn(T)>,
}

impl<T: FlowValue> TypedSink<T> {
    /// Wrap `inner`, checking its kind up front.
    pub fn new(inner: Rc<dyn DynPushPort>) -> Result<Self> {
        if inner.kind() != T::KIND {
            return Err(FlowError::TypeMismatch {
                port: inner.port_name().to_owned(),
                expected: inner.kind(),
                found: T::KIND,
            });
        }
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }
}

impl<T: FlowValue> PushPort<T> for TypedSink<T> {
    fn push(&self, value: T) -> Result<()> {
        self.inner.push_value(value.into_value())
    }
}

impl<T> Clone for TypedSink<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}
