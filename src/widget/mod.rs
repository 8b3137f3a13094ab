//! The widget kit
//!
//! Widgets live in a [`WidgetTree`] arena and refer to each other through
//! [`WidgetId`] handles. Registries, handlers and the focus navigator all hold
//! ids rather than references, so a single owner (the UI instance) can mutate
//! any widget while other tables keep pointing at it.
//!
//! - [`kinds`]: widget structs and the `Container`/`Wrapper` capability traits
//! - [`keys`]: default keypress behaviour per kind

pub mod keys;
pub mod kinds;

use crate::event::EventKind;
use crate::style::Palette;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

pub use keys::KeyOutcome;
pub use kinds::{
    Align, AttrMap, Button, CheckBox, ColumnWidth, Columns, Container, Divider, Edit, GridFlow,
    ListBox, Padding, Pile, RadioButton, Text, Widget, Wrapper,
};

/// Terminal columns taken by the widest line of `text`
pub fn display_width(text: &str) -> usize {
    text.split('\n').map(UnicodeWidthStr::width).max().unwrap_or(0)
}

/// Handle to a widget inside one [`WidgetTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
    pub fn from_index(index: usize) -> Self {
        WidgetId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Description-level attributes attached to a widget at creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub id: Option<String>,
    pub info: Option<String>,
    pub tooltip: Option<String>,
    pub events: BTreeMap<EventKind, String>,
    /// Description line the widget came from (0 for synthesized widgets)
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub widget: Widget,
    pub meta: Meta,
}

/// Arena owning every widget of one UI instance
#[derive(Debug, Clone, Default)]
pub struct WidgetTree {
    nodes: Vec<Node>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, widget: Widget, meta: Meta) -> WidgetId {
        let id = WidgetId(self.nodes.len());
        self.nodes.push(Node { widget, meta });
        id
    }

    /// Add a widget with no description-level attributes
    pub fn add_plain(&mut self, widget: Widget) -> WidgetId {
        self.add(widget, Meta::default())
    }

    /// Ids are only handed out by `add`, so indexing cannot miss for ids of
    /// this tree.
    pub fn node(&self, id: WidgetId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: WidgetId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn widget(&self, id: WidgetId) -> &Widget {
        &self.node(id).widget
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.node_mut(id).widget
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strip style and padding layers
    pub fn unwrap(&self, mut id: WidgetId) -> WidgetId {
        while let Some(wrapper) = self.widget(id).as_wrapper() {
            id = wrapper.inner();
        }
        id
    }

    /// Whether `id` or anything below it can take focus
    pub fn is_selectable(&self, id: WidgetId) -> bool {
        let widget = self.widget(id);
        if widget.is_focusable() {
            return true;
        }
        if let Some(wrapper) = widget.as_wrapper() {
            return self.is_selectable(wrapper.inner());
        }
        widget
            .as_container()
            .is_some_and(|c| c.children().iter().any(|&child| self.is_selectable(child)))
    }

    /// Index of the first selectable child, used as a container's initial focus
    pub fn first_selectable(&self, children: &[WidgetId]) -> usize {
        children
            .iter()
            .position(|&child| self.is_selectable(child))
            .unwrap_or(0)
    }

    /// Wrap `node` in the first style of `candidates` the palette knows.
    ///
    /// Returns `node` itself when none resolves.
    pub fn wrap_style<S: AsRef<str>>(
        &mut self,
        node: WidgetId,
        palette: &Palette,
        candidates: &[S],
    ) -> WidgetId {
        match palette.resolve(candidates) {
            None => node,
            Some(resolved) => {
                let style = palette.style(resolved.normal.as_deref());
                let focus_style = palette.style(resolved.focus.as_deref());
                self.add_plain(Widget::AttrMap(AttrMap {
                    child: node,
                    style,
                    focus_style,
                    names: resolved,
                }))
            }
        }
    }

    /// Uncheck every other radio button of `group`
    pub fn clear_radio_group(&mut self, keep: WidgetId, group: &str) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if index == keep.0 {
                continue;
            }
            if let Widget::RadioButton(radio) = &mut node.widget {
                if radio.group.as_deref() == Some(group) {
                    radio.state = false;
                }
            }
        }
    }

    /// Toggle state for a pressed checkbox or radio button.
    ///
    /// Returns false when `id` is not clickable.
    pub fn activate(&mut self, id: WidgetId) -> bool {
        let group = match self.widget_mut(id) {
            Widget::Button(_) => return true,
            Widget::CheckBox(check) => {
                check.state = !check.state;
                return true;
            }
            Widget::RadioButton(radio) => {
                radio.state = true;
                radio.group.clone()
            }
            _ => return false,
        };
        if let Some(group) = group {
            self.clear_radio_group(id, &group);
        }
        true
    }
}
