//! Modal dialogs
//!
//! A dialog is a separate [`Ui`] with its own widget registry, string table
//! and handler. Its palette is layered over the built-in dialog palette, which
//! is layered over the console palette, so a dialog only needs to define the
//! styles it changes.
//!
//! While a dialog is shown the console routes every key, press, focus and
//! edit event to it. Ending it runs its end callback against the console UI
//! and hands routing back.
//!
//! ```text
//! ┌ dialog ──────────────┐
//! │ header               │░░  shadow
//! │                      │░░
//! │ description body     │░░
//! └──────────────────────┘░░
//!   ░░░░░░░░░░░░░░░░░░░░░░░░  shadow.border + shadow
//! ```

use super::console::Context;
use super::Ui;
use crate::errors::UiResult;
use crate::event::{Dispatcher, Handler};
use crate::registry::StringTable;
use crate::style::Palette;
use crate::widget::{ColumnWidth, Columns, Divider, Padding, Pile, Text, Widget, WidgetId};
use std::rc::Rc;
use tracing::debug;

pub const DEFAULT_DIALOG_WIDTH: u16 = 40;
const SHADOW_WIDTH: u16 = 2;

/// Runs when the dialog ends, with the dialog's UI and a context on the console
pub type EndCallback = Box<dyn FnOnce(&Ui, &mut Context<'_>) -> UiResult<()>>;

pub struct DialogBuilder {
    description: String,
    palette: Option<String>,
    header: Option<String>,
    width: u16,
    height: Option<u16>,
    strings: StringTable,
    handler: Option<Box<dyn Handler>>,
    on_end: Option<EndCallback>,
}

impl DialogBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        DialogBuilder {
            description: description.into(),
            palette: None,
            header: None,
            width: DEFAULT_DIALOG_WIDTH,
            height: None,
            strings: StringTable::new(),
            handler: None,
            on_end: None,
        }
    }

    /// Palette text layered over the dialog defaults
    pub fn palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    /// Header line shown above a divider, replacing the description's `Hdr`
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Fixed height; the natural height of the content when unset
    pub fn height(mut self, height: u16) -> Self {
        self.height = Some(height);
        self
    }

    pub fn strings(mut self, strings: StringTable) -> Self {
        self.strings = strings;
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Ui, &mut Context<'_>) -> UiResult<()> + 'static,
    {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Parse the description over `base` and compose the overlay view
    pub fn build(self, base: Rc<Palette>) -> UiResult<Dialog> {
        let palette = match &self.palette {
            Some(text) => Rc::new(Palette::parse(text)?.with_parent(base)),
            None => base,
        };
        let mut ui = Ui::parse(&self.description, Rc::clone(&palette), self.strings)?;
        let tree = &mut ui.tree;

        // Header and footer come from the description's Hdr and Ftr lines;
        // a header set on the builder replaces the described one
        let header = match self.header {
            Some(header) => {
                let text = tree.add_plain(Widget::Text(Text {
                    text: header,
                    ..Text::default()
                }));
                Some(tree.wrap_style(text, &palette, &["header"]))
            }
            None => ui.header,
        };
        let mut parts = Vec::new();
        if let Some(header) = header {
            parts.push(header);
            parts.push(tree.add_plain(Widget::Divider(Divider::new(' '))));
        }
        let focus = parts.len();
        parts.push(ui.root);
        if let Some(footer) = ui.footer {
            parts.push(tree.add_plain(Widget::Divider(Divider::new(' '))));
            parts.push(footer);
        }
        let content = if parts.len() == 1 {
            ui.root
        } else {
            tree.add_plain(Widget::Pile(Pile {
                children: parts,
                focus,
            }))
        };

        let padded = tree.add_plain(Widget::Padding(Padding {
            child: content,
            left: 1,
            right: 1,
        }));
        let framed = tree.wrap_style(padded, &palette, &["dialog"]);

        let view = if palette.contains("shadow") {
            let mut strip = |name: &str| {
                let blank = tree.add_plain(Widget::Text(Text::default()));
                tree.wrap_style(blank, &palette, &[name])
            };
            let side = strip("shadow");
            let corner = strip("shadow.border");
            let bottom = strip("shadow");

            let upper = tree.add_plain(Widget::Columns(Columns {
                children: vec![framed, side],
                widths: vec![ColumnWidth::Weight(1), ColumnWidth::Fixed(SHADOW_WIDTH)],
                dividechars: 0,
                focus: 0,
            }));
            let lower = tree.add_plain(Widget::Columns(Columns {
                children: vec![corner, bottom],
                widths: vec![ColumnWidth::Fixed(SHADOW_WIDTH), ColumnWidth::Weight(1)],
                dividechars: 0,
                focus: 0,
            }));
            tree.add_plain(Widget::Pile(Pile {
                children: vec![upper, lower],
                focus: 0,
            }))
        } else {
            framed
        };

        let mut dispatcher = Dispatcher::new();
        if let Some(handler) = self.handler {
            dispatcher.push(handler);
        }
        debug!(width = self.width, height = ?self.height, widgets = ui.widgets.len(), "dialog built");

        Ok(Dialog {
            ui,
            view,
            width: self.width,
            height: self.height,
            dispatcher,
            on_end: self.on_end,
        })
    }
}

/// A built dialog, owned by the console while displayed
pub struct Dialog {
    pub(crate) ui: Ui,
    /// Top of the composed overlay: shadow, frame and padding around the
    /// header, `ui.root()` and footer
    pub(crate) view: WidgetId,
    width: u16,
    height: Option<u16>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) on_end: Option<EndCallback>,
}

impl Dialog {
    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    pub fn view(&self) -> WidgetId {
        self.view
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> Option<u16> {
        self.height
    }

    pub fn push_handler(&mut self, handler: impl Handler + 'static) {
        self.dispatcher.push(Box::new(handler));
    }
}
