//! The demo's editor menu: headless widgets joined to a configured graph.

use std::rc::Rc;

use tracing::info;
use wirekit::prelude::*;
use wirekit::{GraphConfig, dyn_sink};

/// Graph file used when no `--graph` is given.
pub const DEFAULT_GRAPH: &str = include_str!("../graphs/editor.toml");

pub struct Editor {
    pub graph: WiringGraph,
    pub save: Rc<MenuItem>,
    pub close: Rc<MenuItem>,
    pub status_label: Rc<TextLabel>,
    pub title_label: Rc<TextLabel>,
}

impl Editor {
    /// Register the widgets, apply `config`, then wire the pull-side inputs.
    pub fn build(config: &GraphConfig) -> Result<Self, FlowError> {
        let save = Rc::new(MenuItem::new("Save").with_instance_name("save"));
        let close = Rc::new(
            MenuItem::new("Close")
                .with_instance_name("close")
                .with_visible(false),
        );
        let status_label = Rc::new(TextLabel::new("").with_instance_name("status_label"));
        let title_label = Rc::new(
            TextLabel::new("")
                .with_instance_name("title_label")
                .with_border(true),
        );

        let status = Connector::<String>::named("status");
        status.fan_out(Rc::clone(&status_label));

        let mut graph = WiringGraph::new();
        graph.insert_connector(status.clone())?;
        graph.add_sink("close_menu", dyn_sink::<bool, _>("close_menu", Rc::clone(&close)))?;
        graph.add_sink("save_visible", dyn_sink::<bool, _>("save_visible", Rc::clone(&save)))?;
        graph.add_sink(
            "title_label",
            dyn_sink::<String, _>("title_label", Rc::clone(&title_label)),
        )?;
        graph.add_sink(
            "status_writer",
            dyn_sink::<bool, _>(
                "status_writer",
                try_port_fn(move |open: bool| {
                    let text = if open { "document open" } else { "no document" };
                    status.push(text.to_string())
                }),
            ),
        )?;
        graph.apply_config(config)?;

        let document_open = graph
            .connector::<bool>("document_open")
            .ok_or_else(|| FlowError::Config("graph must declare bool connector 'document_open'".into()))?;
        save.wire_enable_input(document_open.clone());

        let closer = document_open.clone();
        close.wire_output(try_port_fn(move |()| closer.push(false)));
        let opener = document_open.clone();
        save.wire_output(try_port_fn(move |()| {
            info!("document saved");
            opener.push(true)
        }));

        document_open.push(false)?;
        info!(nodes = graph.len(), "editor wired");

        Ok(Self {
            graph,
            save,
            close,
            status_label,
            title_label,
        })
    }

    /// Click the named menu item. Returns whether the click was accepted.
    pub fn click(&self, item: &str) -> Result<bool, FlowError> {
        match item {
            "save" => self.save.click(),
            "close" => self.close.click(),
            other => Err(FlowError::UnknownNode(other.to_owned())),
        }
    }

    /// One line per widget describing what a toolkit would draw.
    pub fn describe(&self) -> Vec<String> {
        let menu = |item: &MenuItem| {
            format!(
                "{:<13} visible={} enabled={} fg={}",
                item.instance_name(),
                item.is_visible(),
                item.is_enabled(),
                item.foreground()
            )
        };
        let label = |label: &TextLabel| {
            format!(
                "{:<13} visible={} text={:?}",
                label.instance_name(),
                label.is_visible(),
                label.text()
            )
        };
        vec![
            menu(&self.save),
            menu(&self.close),
            label(&self.status_label),
            label(&self.title_label),
        ]
    }
}
