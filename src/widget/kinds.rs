//! Widget kinds
//!
//! Leaves: [`Text`], [`Button`], [`Edit`], [`CheckBox`], [`RadioButton`], [`Divider`].
//! Containers: [`Pile`], [`Columns`], [`GridFlow`], [`ListBox`].
//! Wrappers: [`Padding`], [`AttrMap`] (the style wrapper).
//!
//! Containers and wrappers expose their structure through the [`Container`]
//! and [`Wrapper`] capability traits so that focus descent never needs to
//! know the concrete kind.

use super::WidgetId;
use crate::style::ResolvedStyle;
use ratatui::style::Style;

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }

    /// Left offset of `used` columns inside `available`
    pub fn offset(self, available: u16, used: u16) -> u16 {
        let slack = available.saturating_sub(used);
        match self {
            Align::Left => 0,
            Align::Center => slack / 2,
            Align::Right => slack,
        }
    }
}

/// A container that keeps a focus index over its children
pub trait Container {
    fn children(&self) -> &[WidgetId];
    fn focus_index(&self) -> usize;
    fn set_focus_index(&mut self, index: usize);

    fn focused_child(&self) -> Option<WidgetId> {
        self.children().get(self.focus_index()).copied()
    }
}

/// A single-child layer that is transparent to focus
pub trait Wrapper {
    fn inner(&self) -> WidgetId;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    pub text: String,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Edit {
    pub caption: String,
    pub text: String,
    /// Cursor position, in characters
    pub cursor: usize,
    pub multiline: bool,
}

impl Edit {
    pub fn new(caption: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Edit {
            caption: caption.into(),
            text,
            cursor,
            multiline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckBox {
    pub label: String,
    pub state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioButton {
    pub label: String,
    pub state: bool,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divider {
    pub fill: char,
    pub caption: String,
    pub top: usize,
    pub bottom: usize,
}

impl Divider {
    pub fn new(fill: char) -> Self {
        Divider {
            fill,
            caption: String::new(),
            top: 0,
            bottom: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pile {
    pub children: Vec<WidgetId>,
    pub focus: usize,
}

/// Width of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Share of the space left after fixed columns
    Weight(u16),
    Fixed(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns {
    pub children: Vec<WidgetId>,
    pub widths: Vec<ColumnWidth>,
    pub dividechars: u16,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFlow {
    pub children: Vec<WidgetId>,
    pub cell_width: u16,
    pub h_sep: u16,
    pub v_sep: u16,
    pub align: Align,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListBox {
    pub children: Vec<WidgetId>,
    /// Visible rows; the natural height of the children when absent
    pub height: Option<u16>,
    pub border: bool,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Padding {
    pub child: WidgetId,
    pub left: u16,
    pub right: u16,
}

/// Style wrapper: paints its area with `style`, or `focus_style` when on the
/// focus path
#[derive(Debug, Clone, PartialEq)]
pub struct AttrMap {
    pub child: WidgetId,
    pub style: Style,
    pub focus_style: Style,
    pub names: ResolvedStyle,
}

macro_rules! impl_container {
    ($($kind:ty),*) => {
        $(impl Container for $kind {
            fn children(&self) -> &[WidgetId] {
                &self.children
            }

            fn focus_index(&self) -> usize {
                self.focus
            }

            fn set_focus_index(&mut self, index: usize) {
                self.focus = index;
            }
        })*
    };
}

impl_container!(Pile, Columns, GridFlow, ListBox);

impl Wrapper for Padding {
    fn inner(&self) -> WidgetId {
        self.child
    }
}

impl Wrapper for AttrMap {
    fn inner(&self) -> WidgetId {
        self.child
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text(Text),
    Button(Button),
    Edit(Edit),
    CheckBox(CheckBox),
    RadioButton(RadioButton),
    Divider(Divider),
    Pile(Pile),
    Columns(Columns),
    GridFlow(GridFlow),
    ListBox(ListBox),
    Padding(Padding),
    AttrMap(AttrMap),
}

impl Widget {
    /// Class name used as the last style candidate
    pub fn kind_name(&self) -> &'static str {
        match self {
            Widget::Text(_) => "Text",
            Widget::Button(_) => "Button",
            Widget::Edit(_) => "Edit",
            Widget::CheckBox(_) => "CheckBox",
            Widget::RadioButton(_) => "RadioButton",
            Widget::Divider(_) => "Divider",
            Widget::Pile(_) => "Pile",
            Widget::Columns(_) => "Columns",
            Widget::GridFlow(_) => "GridFlow",
            Widget::ListBox(_) => "ListBox",
            Widget::Padding(_) => "Padding",
            Widget::AttrMap(_) => "AttrMap",
        }
    }

    pub fn as_container(&self) -> Option<&dyn Container> {
        match self {
            Widget::Pile(w) => Some(w),
            Widget::Columns(w) => Some(w),
            Widget::GridFlow(w) => Some(w),
            Widget::ListBox(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut dyn Container> {
        match self {
            Widget::Pile(w) => Some(w),
            Widget::Columns(w) => Some(w),
            Widget::GridFlow(w) => Some(w),
            Widget::ListBox(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_wrapper(&self) -> Option<&dyn Wrapper> {
        match self {
            Widget::Padding(w) => Some(w),
            Widget::AttrMap(w) => Some(w),
            _ => None,
        }
    }

    /// Kinds that can hold keyboard focus
    pub fn is_focusable(&self) -> bool {
        matches!(
            self,
            Widget::Edit(_) | Widget::Button(_) | Widget::CheckBox(_) | Widget::RadioButton(_)
        )
    }

    /// Kinds that accept a press binding
    pub fn is_clickable(&self) -> bool {
        matches!(
            self,
            Widget::Button(_) | Widget::CheckBox(_) | Widget::RadioButton(_)
        )
    }

    /// Kinds that accept an edit binding
    pub fn is_editable(&self) -> bool {
        matches!(self, Widget::Edit(_))
    }

    /// Displayed text: caption and edit text for edits, the text for text widgets
    pub fn text(&self) -> Option<String> {
        match self {
            Widget::Text(t) => Some(t.text.clone()),
            Widget::Edit(e) => Some(format!("{}{}", e.caption, e.text)),
            Widget::Divider(d) => Some(d.caption.clone()),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Widget::Button(b) => Some(&b.label),
            Widget::CheckBox(c) => Some(&c.label),
            Widget::RadioButton(r) => Some(&r.label),
            _ => None,
        }
    }

    pub fn edit_text(&self) -> Option<&str> {
        match self {
            Widget::Edit(e) => Some(&e.text),
            _ => None,
        }
    }
}
