#![forbid(unsafe_code)]

//! Headless components for wirekit graphs.
//!
//! These components hold the state a toolkit would render (text, visibility,
//! enabled state, colours) and expose it only through wirekit ports. Drawing
//! them is left to whichever toolkit embeds the graph.

pub mod color;
pub mod menu_item;
pub mod text_label;

pub use color::Rgb;
pub use menu_item::MenuItem;
pub use text_label::TextLabel;

/// Instance name of components that were not given one.
pub const DEFAULT_INSTANCE_NAME: &str = wirekit_core::DEFAULT_INSTANCE_NAME;

/// State shared by every headless component.
pub trait Component {
    /// Name used in logs to tell instances apart.
    fn instance_name(&self) -> &str;

    /// Whether a toolkit should currently display the component.
    fn is_visible(&self) -> bool;
}
