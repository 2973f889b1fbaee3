//! A clickable menu entry wired through ports.
//!
//! # Ports
//!
//! | Port | Direction | Effect |
//! |------|-----------|--------|
//! | `PushPort<bool>` | input | shows or collapses the item |
//! | enable input (`PullPort<bool>`) | input | re-read on every change; `false` greys the item out |
//! | output (`PushPort<()>`) | output | fired when the item is clicked |
//!
//! The enable input is pulled, not pushed: the item listens for the source's
//! change notification and reads the current value itself. Wiring it does not
//! read the source; the item stays enabled until the first notification.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use wirekit_core::{PullPort, PushPort, Result, Subscription};

use crate::Component;
use crate::color::Rgb;

/// Headless menu item state.
pub struct MenuItem {
    instance_name: String,
    title: String,
    icon: Option<String>,
    visible: Cell<bool>,
    enabled: Cell<bool>,
    foreground: Cell<Rgb>,
    output: RefCell<Option<Rc<dyn PushPort<()>>>>,
    enable_input: RefCell<Option<Subscription>>,
}

impl MenuItem {
    /// A visible, enabled item showing `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            instance_name: crate::DEFAULT_INSTANCE_NAME.to_owned(),
            title: title.into(),
            icon: None,
            visible: Cell::new(true),
            enabled: Cell::new(true),
            foreground: Cell::new(Rgb::BLACK),
            output: RefCell::new(None),
            enable_input: RefCell::new(None),
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

    /// Resource name of the icon shown next to the title.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.icon = (!icon.is_empty()).then_some(icon);
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    #[must_use]
    pub fn foreground(&self) -> Rgb {
        self.foreground.get()
    }

    /// Connect the click output.
    pub fn wire_output(&self, sink: impl PushPort<()> + 'static) {
        *self.output.borrow_mut() = Some(Rc::new(sink));
    }

    /// Connect the enable input, replacing any previous one.
    pub fn wire_enable_input<P>(self: &Rc<Self>, source: P)
    where
        P: PullPort<bool> + Clone + 'static,
    {
        let reader = source.clone();
        let item: Weak<Self> = Rc::downgrade(self);
        let sub = source.on_change(move || {
            if let Some(item) = item.upgrade() {
                item.apply_enabled(reader.read());
            }
        });
        *self.enable_input.borrow_mut() = Some(sub);
    }

    /// Disconnect the enable input.
    pub fn unwire_enable_input(&self) {
        self.enable_input.borrow_mut().take();
    }

    fn apply_enabled(&self, enabled: bool) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            widget = "MenuItem",
            instance = %self.instance_name,
            enabled,
            "enable input changed"
        );
        self.enabled.set(enabled);
        self.foreground
            .set(if enabled { Rgb::BLACK } else { Rgb::DARK_GRAY });
    }

    /// Simulate a user click.
    ///
    /// Collapsed or disabled items ignore clicks. Returns whether the output
    /// fired; an error from the output's reaction is returned unchanged.
    pub fn click(&self) -> Result<bool> {
        if !self.visible.get() || !self.enabled.get() {
            return Ok(false);
        }
        let output = self.output.borrow().clone();
        match output {
            Some(output) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(widget = "MenuItem", instance = %self.instance_name, "clicked");
                output.push(())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl PushPort<bool> for MenuItem {
    fn push(&self, visible: bool) -> Result<()> {
        self.visible.set(visible);
        Ok(())
    }
}

impl Component for MenuItem {
    fn instance_name(&self) -> &str {
        &self.instance_name
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("instance_name", &self.instance_name)
            .field("title", &self.title)
            .field("visible", &self.visible.get())
            .field("enabled", &self.enabled.get())
            .field("foreground", &self.foreground.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use wirekit_core::{Connector, FlowError, port_fn, try_port_fn};

    use super::*;

    #[test]
    fn defaults() {
        let item = MenuItem::new("Open").with_icon("open.png");
        assert_eq!(item.title(), "Open");
        assert_eq!(item.icon(), Some("open.png"));
        assert!(item.is_visible());
        assert!(item.is_enabled());
        assert_eq!(item.foreground(), Rgb::BLACK);
        assert_eq!(item.instance_name(), "Default");
        assert_eq!(MenuItem::new("x").with_icon("").icon(), None);
    }

    #[test]
    fn visibility_port() {
        let item = MenuItem::new("Save");
        item.push(false).unwrap();
        assert!(!item.is_visible());
        item.push(true).unwrap();
        assert!(item.is_visible());
    }

    #[test]
    fn enable_input_follows_connector() {
        let item = Rc::new(MenuItem::new("Paste"));
        let can_paste = Connector::<bool>::named("can_paste");
        item.wire_enable_input(can_paste.clone());

        assert!(item.is_enabled(), "wiring alone must not read the source");

        can_paste.push(false).unwrap();
        assert!(!item.is_enabled());
        assert_eq!(item.foreground(), Rgb::DARK_GRAY);

        can_paste.push(true).unwrap();
        assert!(item.is_enabled());
        assert_eq!(item.foreground(), Rgb::BLACK);
    }

    #[test]
    fn unwire_stops_following() {
        let item = Rc::new(MenuItem::new("Cut"));
        let source = Connector::<bool>::new();
        item.wire_enable_input(source.clone());
        item.unwire_enable_input();
        source.push(false).unwrap();
        assert!(item.is_enabled());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn dropped_item_detaches_listener() {
        let source = Connector::<bool>::new();
        {
            let item = Rc::new(MenuItem::new("Tmp"));
            item.wire_enable_input(source.clone());
            assert_eq!(source.listener_count(), 1);
        }
        assert_eq!(source.listener_count(), 0);
        source.push(true).unwrap();
    }

    #[test]
    fn click_fires_output_only_when_active() {
        let clicks = Rc::new(Cell::new(0));
        let c = Rc::clone(&clicks);
        let item = Rc::new(MenuItem::new("Quit"));
        item.wire_output(port_fn(move |()| c.set(c.get() + 1)));

        assert!(item.click().unwrap());
        item.push(false).unwrap();
        assert!(!item.click().unwrap());
        item.push(true).unwrap();

        let enabled = Connector::<bool>::new();
        item.wire_enable_input(enabled.clone());
        enabled.push(false).unwrap();
        assert!(!item.click().unwrap());

        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn click_without_output() {
        assert!(!MenuItem::new("Help").click().unwrap());
    }

    #[test]
    fn click_error_propagates() {
        let item = MenuItem::new("Export");
        item.wire_output(try_port_fn(|()| Err(FlowError::reaction("exporter", "disk full"))));
        assert!(item.click().is_err());
    }

    #[test]
    fn item_as_fan_out_sink() {
        let menu = Rc::new(MenuItem::new("View").with_visible(false));
        let show = Connector::<bool>::new();
        show.fan_out(Rc::clone(&menu));
        show.push(true).unwrap();
        assert!(menu.is_visible());
    }
}
