//! Terminal runtime built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`Ui`]**: one parsed description: the widget tree plus its registries
//! - **[`console`]**: the main loop, the [`console::Context`] handed to
//!   responders, and the handler stack
//! - **[`dialog`]**: modal overlays with their own description and handler
//! - **[`focus`]**: focused-leaf lookup and Tab/Shift-Tab navigation
//! - **[`render`]**: stateless drawing of the widget tree into a frame
//! - **[`screen`]**: the terminal abstraction the loop draws to and polls
//! - **[`theme`]**: fallback colors and the built-in dialog palette

pub mod console;
pub mod dialog;
pub mod focus;
pub mod render;
pub mod screen;
pub mod theme;

pub use console::{Console, Context};
pub use dialog::{Dialog, DialogBuilder};
pub use screen::{CrosstermScreen, InputEvent, Screen, ScriptedScreen};

use crate::errors::{RuntimeError, UiResult};
use crate::event::EventKind;
use crate::parser::TreeBuilder;
use crate::registry::{StringTable, WidgetRegistry};
use crate::style::Palette;
use crate::widget::{Widget, WidgetId, WidgetTree};
use std::fmt::Write as _;
use std::rc::Rc;

/// A parsed description: widgets, their names, the strings they refer to and
/// the palette they were styled with
#[derive(Debug)]
pub struct Ui {
    pub(crate) tree: WidgetTree,
    pub(crate) widgets: WidgetRegistry,
    pub(crate) strings: StringTable,
    pub(crate) palette: Rc<Palette>,
    pub(crate) header: Option<WidgetId>,
    pub(crate) footer: Option<WidgetId>,
    /// The list box holding the top-level widgets
    pub(crate) body: WidgetId,
    /// `body`, or its `Frame` style wrapper
    pub(crate) root: WidgetId,
}

impl Ui {
    pub fn parse(description: &str, palette: Rc<Palette>, strings: StringTable) -> UiResult<Self> {
        TreeBuilder::build(description, palette, strings)
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn palette(&self) -> &Rc<Palette> {
        &self.palette
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn body(&self) -> WidgetId {
        self.body
    }

    pub fn header(&self) -> Option<WidgetId> {
        self.header
    }

    pub fn footer(&self) -> Option<WidgetId> {
        self.footer
    }

    /// Look up a widget by its `#id`
    pub fn widget(&self, name: &str) -> UiResult<WidgetId> {
        Ok(self.widgets.get(name)?)
    }

    /// Look up a string-table entry
    pub fn string(&self, key: &str) -> UiResult<&str> {
        Ok(self.strings.get(key)?)
    }

    /// Displayed text of a text, edit or divider widget
    pub fn text(&self, name: &str) -> UiResult<String> {
        let id = self.widget(name)?;
        self.tree.widget(id).text().ok_or_else(|| {
            RuntimeError::NotText {
                id: name.to_string(),
            }
            .into()
        })
    }

    /// Replace the text of a text widget, the edit text of an edit or the
    /// caption of a divider
    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> UiResult<()> {
        let id = self.widget(name)?;
        match self.tree.widget_mut(id) {
            Widget::Text(t) => t.text = text.into(),
            Widget::Edit(e) => {
                e.text = text.into();
                e.cursor = e.text.chars().count();
            }
            Widget::Divider(d) => d.caption = text.into(),
            _ => {
                return Err(RuntimeError::NotText {
                    id: name.to_string(),
                }
                .into())
            }
        }
        Ok(())
    }

    pub fn edit_text(&self, name: &str) -> UiResult<&str> {
        let id = self.widget(name)?;
        self.tree.widget(id).edit_text().ok_or_else(|| {
            RuntimeError::NotEditable {
                id: name.to_string(),
            }
            .into()
        })
    }

    pub fn set_edit_text(&mut self, name: &str, text: impl Into<String>) -> UiResult<()> {
        let id = self.widget(name)?;
        match self.tree.widget_mut(id) {
            Widget::Edit(edit) => {
                edit.text = text.into();
                edit.cursor = edit.text.chars().count();
                Ok(())
            }
            _ => Err(RuntimeError::NotEditable {
                id: name.to_string(),
            }
            .into()),
        }
    }

    /// Label of a button, checkbox or radio button
    pub fn label(&self, name: &str) -> UiResult<&str> {
        let id = self.widget(name)?;
        self.tree.widget(id).label().ok_or_else(|| {
            RuntimeError::NotText {
                id: name.to_string(),
            }
            .into()
        })
    }

    /// State of a checkbox or radio button
    pub fn state(&self, name: &str) -> UiResult<bool> {
        let id = self.widget(name)?;
        match self.tree.widget(id) {
            Widget::CheckBox(check) => Ok(check.state),
            Widget::RadioButton(radio) => Ok(radio.state),
            _ => Err(RuntimeError::NotText {
                id: name.to_string(),
            }
            .into()),
        }
    }

    /// Every binding in the description, in tree order
    pub fn bindings(&self) -> Vec<(EventKind, String)> {
        let mut out = Vec::new();
        for index in 0..self.tree.len() {
            let node = self.tree.node(WidgetId::from_index(index));
            for (kind, responder) in &node.meta.events {
                out.push((*kind, responder.clone()));
            }
        }
        out
    }

    /// Indented dump of the widget tree, one widget per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        if let Some(header) = self.header {
            self.outline_node(&mut out, header, 0);
        }
        self.outline_node(&mut out, self.root, 0);
        if let Some(footer) = self.footer {
            self.outline_node(&mut out, footer, 0);
        }
        out
    }

    fn outline_node(&self, out: &mut String, id: WidgetId, depth: usize) {
        let node = self.tree.node(id);
        let widget = &node.widget;
        let _ = write!(out, "{:indent$}{}", "", widget.kind_name(), indent = depth * 2);
        if let Some(name) = &node.meta.id {
            let _ = write!(out, " #{}", name);
        }
        match widget {
            Widget::AttrMap(map) => {
                if let Some(normal) = &map.names.normal {
                    let _ = write!(out, " @{}", normal);
                }
            }
            _ => {
                if let Some(label) = widget.label() {
                    let _ = write!(out, " [{}]", label);
                } else if let Some(text) = widget.text().filter(|t| !t.is_empty()) {
                    let _ = write!(out, " {:?}", text);
                }
            }
        }
        for (kind, responder) in &node.meta.events {
            let _ = write!(out, " &{}={}", kind.name(), responder);
        }
        out.push('\n');

        if let Some(wrapper) = widget.as_wrapper() {
            self.outline_node(out, wrapper.inner(), depth + 1);
        } else if let Some(container) = widget.as_container() {
            for &child in container.children() {
                self.outline_node(out, child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UiError;

    fn parse(description: &str) -> Ui {
        Ui::parse(description, Rc::new(Palette::default()), StringTable::new()).unwrap()
    }

    #[test]
    fn test_text_accessors() {
        let mut ui = parse("Txt Hello args:#hello\nEdt Subject [Hi] #subject\nBtn [OK] #ok");
        assert_eq!(ui.text("hello").unwrap(), "Hello");
        assert_eq!(ui.text("subject").unwrap(), "Subject Hi");
        assert_eq!(ui.edit_text("subject").unwrap(), "Hi");

        ui.set_text("hello", "Bye").unwrap();
        ui.set_edit_text("subject", "Re: Hi").unwrap();
        assert_eq!(ui.text("hello").unwrap(), "Bye");
        assert_eq!(ui.edit_text("subject").unwrap(), "Re: Hi");

        assert!(matches!(
            ui.edit_text("ok").unwrap_err(),
            UiError::Runtime(RuntimeError::NotEditable { .. })
        ));
        assert!(matches!(
            ui.text("missing").unwrap_err(),
            UiError::Runtime(RuntimeError::UndefinedId { .. })
        ));
    }

    #[test]
    fn test_outline() {
        let ui = parse("Hdr Title\nPle #p\nBtn [OK] #ok &press=ok\nEnd");
        let outline = ui.outline();
        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "Text \"Title\"");
        assert_eq!(lines[1], "ListBox");
        assert_eq!(lines[2], "  Pile #p");
        assert_eq!(lines[3], "    Button #ok [OK] &press=ok");
    }

    #[test]
    fn test_bindings() {
        let ui = parse("Btn [A] &press=a\nEdt [x] &edit=changed &key=keys");
        assert_eq!(
            ui.bindings(),
            vec![
                (EventKind::Press, "a".to_string()),
                (EventKind::Edit, "changed".to_string()),
                (EventKind::Key, "keys".to_string()),
            ]
        );
    }
}
