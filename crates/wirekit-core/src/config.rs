//! Declarative graph configuration (requires the `graph-config` feature).
//!
//! A graph file lists connectors with their kind, fan-out targets, optional
//! last target and optional initial value:
//!
//! ```toml
//! [[connector]]
//! name = "visible"
//! kind = "bool"
//! fan_out = ["file_menu", "status_label"]
//! last = "audit"
//! initial = true
//! ```
//!
//! Targets may name other connectors of the same file or sinks registered on
//! the graph before [`WiringGraph::apply_config`] runs.
//!
//! # Application order
//!
//! 0. the whole file is checked against the graph (names, targets, kinds,
//!    initial values); on any error the graph is left untouched;
//! 1. every connector is created (so targets may be declared later in the file);
//! 2. fan-out edges then last edges are wired, connector by connector, in file order;
//! 3. initial values are pushed in file order, propagating through the graph.
//!
//! A reaction failing during step 3 is returned as is; the connectors and
//! edges stay in place at that point.

use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;
use tracing::info;

use crate::error::{FlowError, Result};
use crate::graph::WiringGraph;
use crate::value::{Value, ValueKind};

/// Top-level graph file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    #[serde(default, rename = "connector")]
    pub connectors: Vec<ConnectorConfig>,
}

/// One `[[connector]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub fan_out: Vec<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub initial: Option<toml::Value>,
}

impl GraphConfig {
    /// Parse a graph description from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| FlowError::Config(err.to_string()))
    }

    /// Read and parse a graph file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl ConnectorConfig {
    fn initial_value(&self) -> Result<Option<Value>> {
        let Some(raw) = &self.initial else {
            return Ok(None);
        };
        let value = match raw {
            toml::Value::Boolean(b) => Value::Bool(*b),
            toml::Value::Integer(i) if self.kind == ValueKind::Float => Value::Float(*i as f64),
            toml::Value::Integer(i) => Value::Int(*i),
            toml::Value::Float(f) => Value::Float(*f),
            toml::Value::String(s) => Value::Text(s.clone()),
            other => {
                return Err(FlowError::Config(format!(
                    "connector '{}': unsupported initial value of type {}",
                    self.name,
                    other.type_str()
                )));
            }
        };
        Ok(Some(value))
    }
}

impl WiringGraph {
    /// Build a graph from configuration alone (no external sinks).
    pub fn from_config(config: &GraphConfig) -> Result<Self> {
        let mut graph = Self::new();
        graph.apply_config(config)?;
        Ok(graph)
    }

    /// Add the connectors and edges described by `config` to this graph.
    ///
    /// The file is validated as a whole first, so a structural error leaves
    /// the graph as it was and the call can be retried once fixed.
    pub fn apply_config(&mut self, config: &GraphConfig) -> Result<()> {
        let initials = self.check_config(config)?;
        for connector in &config.connectors {
            self.add_connector(&connector.name, connector.kind)?;
        }
        for connector in &config.connectors {
            for target in &connector.fan_out {
                self.wire(&connector.name, target)?;
            }
            if let Some(last) = &connector.last {
                self.wire_last(&connector.name, last)?;
            }
        }
        for (connector, value) in initials {
            self.push(connector, value)?;
        }
        info!(
            connectors = config.connectors.len(),
            nodes = self.len(),
            "graph configuration applied"
        );
        Ok(())
    }

    /// Everything `apply_config` could reject before propagation starts.
    /// Returns the initial values to push, in file order.
    fn check_config<'c>(&self, config: &'c GraphConfig) -> Result<Vec<(&'c str, Value)>> {
        let mut declared: AHashMap<&str, ValueKind> = AHashMap::new();
        for connector in &config.connectors {
            if self.contains(&connector.name)
                || declared.insert(&connector.name, connector.kind).is_some()
            {
                return Err(FlowError::DuplicateName(connector.name.clone()));
            }
        }
        let kind_of = |name: &str| match declared.get(name) {
            Some(kind) => Ok(*kind),
            None => self.kind(name),
        };

        let mut initials = Vec::new();
        for connector in &config.connectors {
            for target in connector.fan_out.iter().chain(&connector.last) {
                let expected = kind_of(target)?;
                if expected != connector.kind {
                    return Err(FlowError::TypeMismatch {
                        port: target.clone(),
                        expected,
                        found: connector.kind,
                    });
                }
            }
            if let Some(value) = connector.initial_value()? {
                if value.kind() != connector.kind {
                    return Err(FlowError::TypeMismatch {
                        port: connector.name.clone(),
                        expected: connector.kind,
                        found: value.kind(),
                    });
                }
                initials.push((connector.name.as_str(), value));
            }
        }
        Ok(initials)
    }
}
