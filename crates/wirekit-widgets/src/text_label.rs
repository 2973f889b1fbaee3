//! A text label with two inputs: its text and its visibility.
//!
//! `TextLabel` implements `PushPort<String>` (replace the text) and
//! `PushPort<bool>` (show or collapse), so one instance can sit in the fan-out
//! of a text connector and a boolean connector at the same time.

use std::cell::{Cell, RefCell};
use std::fmt;

use wirekit_core::{PushPort, Result};

use crate::Component;
use crate::color::Rgb;

/// Headless label state.
pub struct TextLabel {
    instance_name: String,
    text: RefCell<String>,
    visible: Cell<bool>,
    color: Rgb,
    background: Option<Rgb>,
    wrap: bool,
    show_border: bool,
}

impl TextLabel {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            instance_name: crate::DEFAULT_INSTANCE_NAME.to_owned(),
            text: RefCell::new(text.into()),
            visible: Cell::new(true),
            color: Rgb::BLACK,
            background: None,
            wrap: false,
            show_border: false,
        }
    }

    #[must_use]
    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }

    #[must_use]
    pub fn with_visible(self, visible: bool) -> Self {
        self.visible.set(visible);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn with_border(mut self, show_border: bool) -> Self {
        self.show_border = show_border;
        self
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[must_use]
    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    #[must_use]
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Border colour, when the label is framed.
    #[must_use]
    pub fn border(&self) -> Option<Rgb> {
        self.show_border.then_some(Rgb::BORDER_GRAY)
    }
}

impl PushPort<String> for TextLabel {
    fn push(&self, text: String) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::trace!(widget = "TextLabel", instance = %self.instance_name, len = text.len(), "text set");
        *self.text.borrow_mut() = text;
        Ok(())
    }
}

impl PushPort<bool> for TextLabel {
    fn push(&self, visible: bool) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::trace!(widget = "TextLabel", instance = %self.instance_name, visible, "visibility set");
        self.visible.set(visible);
        Ok(())
    }
}

impl Component for TextLabel {
    fn instance_name(&self) -> &str {
        &self.instance_name
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

impl fmt::Debug for TextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLabel")
            .field("instance_name", &self.instance_name)
            .field("text", &*self.text.borrow())
            .field("visible", &self.visible.get())
            .finish_non_exhaustive()
    }
}
