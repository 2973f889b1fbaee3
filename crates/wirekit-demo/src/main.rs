#![forbid(unsafe_code)]

//! Loads a wirekit graph file, drives the editor menu through it and prints
//! what each headless widget would render.

mod editor;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wirekit::{FlowError, GraphConfig, Value, ValueKind};

use crate::editor::{DEFAULT_GRAPH, Editor};

#[derive(Debug, Parser)]
#[command(name = "wirekit-demo", version, about)]
struct Args {
    /// Graph file to apply instead of the bundled editor graph.
    #[arg(long, value_name = "PATH")]
    graph: Option<PathBuf>,

    /// Push a value into a node, e.g. `--set document_open=true`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,

    /// Click a menu item (`save` or `close`) after all pushes.
    #[arg(long = "click", value_name = "ITEM")]
    clicks: Vec<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("expected NAME=VALUE, got '{0}'")]
    BadAssignment(String),

    #[error("cannot parse '{raw}' as {kind} for '{name}'")]
    BadValue {
        name: String,
        kind: ValueKind,
        raw: String,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Split `NAME=VALUE` at the first `=`.
fn split_assignment(arg: &str) -> Result<(&str, &str), DemoError> {
    match arg.split_once('=') {
        Some((name, raw)) if !name.is_empty() => Ok((name.trim(), raw)),
        _ => Err(DemoError::BadAssignment(arg.to_owned())),
    }
}

/// Parse a command-line value according to the kind of the target node.
fn parse_value(name: &str, kind: ValueKind, raw: &str) -> Result<Value, DemoError> {
    let bad = || DemoError::BadValue {
        name: name.to_owned(),
        kind,
        raw: raw.to_owned(),
    };
    match kind {
        ValueKind::Unit if raw.is_empty() || raw == "()" => Ok(Value::Unit),
        ValueKind::Unit => Err(bad()),
        ValueKind::Bool => raw.parse().map(Value::Bool).map_err(|_| bad()),
        ValueKind::Int => raw.parse().map(Value::Int).map_err(|_| bad()),
        ValueKind::Float => raw.parse().map(Value::Float).map_err(|_| bad()),
        ValueKind::Text => Ok(Value::Text(raw.to_owned())),
    }
}

fn run(args: &Args) -> Result<(), DemoError> {
    let config = match &args.graph {
        Some(path) => GraphConfig::load(path)?,
        None => GraphConfig::from_toml_str(DEFAULT_GRAPH)?,
    };
    let editor = Editor::build(&config)?;

    for arg in &args.sets {
        let (name, raw) = split_assignment(arg)?;
        let value = parse_value(name, editor.graph.kind(name)?, raw)?;
        info!(node = name, %value, "push");
        editor.graph.push(name, value)?;
    }
    for item in &args.clicks {
        let accepted = editor.click(item)?;
        info!(item = %item, accepted, "click");
    }

    for line in editor.describe() {
        println!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.json);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "demo failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
