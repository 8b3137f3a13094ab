//! Widget tree builder
//!
//! Turns a description into a [`Ui`]. Each line is dispatched on its first
//! three characters through [`OPCODES`]:
//!
//! ```text
//! Hdr Mail Editor              header (once)
//! Edt To [recipients] #to ?TO  edit field
//! ---                          divider shorthand (any three identical characters)
//! GFl                          open a grid flow...
//! Btn [Send] &press=send
//! End                          ...and close it
//! ```
//!
//! Leaves are appended to the children of the innermost open container.
//! Opening a container pushes a [`ContainerFrame`] that buffers the children
//! until the matching `End` pops it and builds the composite widget.

use super::arguments::Arguments;
use super::attributes::{parse_attributes, UiAttributes};
use crate::errors::{RuntimeError, SyntaxError, UiResult};
use crate::registry::{StringTable, WidgetRegistry};
use crate::style::Palette;
use crate::ui::Ui;
use crate::widget::{
    display_width, Align, Button, CheckBox, ColumnWidth, Columns, Divider, Edit,
    GridFlow, ListBox, Meta, Pile, RadioButton, Text, Widget, WidgetId, WidgetTree,
};
use std::rc::Rc;
use tracing::debug;

/// Horizontal margin added to the widest grid-flow child
pub const GRID_FLOW_MARGIN: usize = 4;

const ARGS_SEPARATOR: &str = "args:";

pub type LineParser = fn(&mut TreeBuilder, &str) -> UiResult<()>;

/// Opcode → line parser
pub const OPCODES: &[(&str, LineParser)] = &[
    ("Hdr", TreeBuilder::parse_header),
    ("Ftr", TreeBuilder::parse_footer),
    ("Txt", TreeBuilder::parse_text),
    ("Btn", TreeBuilder::parse_button),
    ("Edt", TreeBuilder::parse_edit),
    ("Chc", TreeBuilder::parse_checkbox),
    ("Rdo", TreeBuilder::parse_radio),
    ("Dvd", TreeBuilder::parse_divider),
    ("Ple", TreeBuilder::parse_pile),
    ("Col", TreeBuilder::parse_columns),
    ("GFl", TreeBuilder::parse_grid_flow),
    ("Box", TreeBuilder::parse_list_box),
    ("End", TreeBuilder::parse_end),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Pile,
    Columns,
    GridFlow,
    ListBox,
}

impl ContainerKind {
    fn class(self) -> &'static str {
        match self {
            ContainerKind::Pile => "Pile",
            ContainerKind::Columns => "Columns",
            ContainerKind::GridFlow => "GridFlow",
            ContainerKind::ListBox => "ListBox",
        }
    }
}

/// An open container: the parent's children so far, and what the container
/// line asked for
#[derive(Debug)]
pub struct ContainerFrame {
    pub kind: ContainerKind,
    pub parent_content: Vec<WidgetId>,
    pub attrs: UiAttributes,
    pub args: Arguments,
    pub line: usize,
}

#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<ContainerFrame>,
}

impl FrameStack {
    pub fn push(&mut self, frame: ContainerFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ContainerFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

pub struct TreeBuilder {
    palette: Rc<Palette>,
    strings: StringTable,
    tree: WidgetTree,
    widgets: WidgetRegistry,
    content: Vec<WidgetId>,
    stack: FrameStack,
    header: Option<WidgetId>,
    footer: Option<WidgetId>,
    line: usize,
}

/// Split `Txt Hello args:#id` into the literal text and the attribute part
fn split_text(data: &str) -> (&str, &str) {
    match data.find(ARGS_SEPARATOR) {
        Some(at) => (data[..at].trim_end(), &data[at + ARGS_SEPARATOR.len()..]),
        None => (data, ""),
    }
}

/// `[label] rest` → (label, rest)
fn bracketed(data: &str) -> Option<(&str, &str)> {
    let inner = data.trim_start().strip_prefix('[')?;
    let close = inner.find(']')?;
    Some((&inner[..close], &inner[close + 1..]))
}

impl TreeBuilder {
    pub fn new(palette: Rc<Palette>, strings: StringTable) -> Self {
        TreeBuilder {
            palette,
            strings,
            tree: WidgetTree::new(),
            widgets: WidgetRegistry::new(),
            content: Vec::new(),
            stack: FrameStack::default(),
            header: None,
            footer: None,
            line: 0,
        }
    }

    /// Parse a whole description.
    ///
    /// `${KEY}` templates are substituted from the string table first.
    pub fn build(description: &str, palette: Rc<Palette>, strings: StringTable) -> UiResult<Ui> {
        let text = strings.substitute(description)?;
        let mut builder = TreeBuilder::new(palette, strings);
        for (index, raw) in text.split('\n').enumerate() {
            builder.line = index + 1;
            let line = raw.trim();
            if line.starts_with('#') {
                continue;
            }
            builder.parse_line(line)?;
        }
        builder.finish()
    }

    fn parse_line(&mut self, line: &str) -> UiResult<()> {
        if line.is_empty() {
            let spacer = self.tree.add(
                Widget::Text(Text::default()),
                Meta {
                    line: self.line,
                    ..Meta::default()
                },
            );
            self.content.push(spacer);
            return Ok(());
        }

        let opcode_end = match line.char_indices().nth(3) {
            Some((at, _)) => at,
            None if line.chars().count() == 3 => line.len(),
            None => {
                return Err(SyntaxError::UnrecognizedWidget {
                    opcode: line.to_string(),
                    line: self.line,
                }
                .into())
            }
        };
        let (opcode, data) = line.split_at(opcode_end);
        let data = data.trim();

        if let Some((_, parser)) = OPCODES.iter().find(|(name, _)| *name == opcode) {
            debug!(line = self.line, opcode, "parse");
            return parser(self, data);
        }

        let mut chars = opcode.chars();
        if let Some(first) = chars.next() {
            if chars.all(|c| c == first) {
                return self.parse_divider_shorthand(first, data);
            }
        }

        Err(SyntaxError::UnrecognizedWidget {
            opcode: opcode.to_string(),
            line: self.line,
        }
        .into())
    }

    fn finish(mut self) -> UiResult<Ui> {
        if self.stack.depth() != 0 {
            return Err(SyntaxError::UnclosedContainer {
                depth: self.stack.depth(),
            }
            .into());
        }

        let children = std::mem::take(&mut self.content);
        let focus = self.tree.first_selectable(&children);
        let body = self.tree.add_plain(Widget::ListBox(ListBox {
            children,
            height: None,
            border: false,
            focus,
        }));
        let root = self.apply_style(body, None, &[], "Frame");

        Ok(Ui {
            tree: self.tree,
            widgets: self.widgets,
            strings: self.strings,
            palette: self.palette,
            header: self.header,
            footer: self.footer,
            body,
            root,
        })
    }

    // ===== Widget registration =====

    /// Register a freshly built widget: capability checks, id binding,
    /// string keys and style resolution. Returns the id to place in the tree,
    /// which is the style wrapper when a style applies.
    fn add_widget(
        &mut self,
        widget: Widget,
        attrs: UiAttributes,
        class: &str,
        line: usize,
    ) -> UiResult<WidgetId> {
        for kind in attrs.events.keys() {
            if !kind.accepts(&widget) {
                return Err(RuntimeError::BindingMismatch {
                    event: kind.name(),
                    widget: widget.kind_name(),
                    line,
                }
                .into());
            }
        }
        for key in attrs.info.iter().chain(attrs.tooltip.iter()) {
            self.strings.get(key)?;
        }

        let UiAttributes {
            id,
            styles,
            info,
            tooltip,
            events,
        } = attrs;
        let node = self.tree.add(
            widget,
            Meta {
                id: id.clone(),
                info,
                tooltip,
                events,
                line,
            },
        );
        if let Some(name) = &id {
            self.widgets.register(name, node)?;
        }
        Ok(self.apply_style(node, id.as_deref(), &styles, class))
    }

    /// Wrap `node` in its resolved style: `#id`, then each `@style`, then the class
    fn apply_style(
        &mut self,
        node: WidgetId,
        id: Option<&str>,
        styles: &[String],
        class: &str,
    ) -> WidgetId {
        let mut candidates = Vec::with_capacity(styles.len() + 2);
        if let Some(id) = id {
            candidates.push(format!("#{}", id));
        }
        candidates.extend(styles.iter().cloned());
        candidates.push(class.to_string());

        self.tree.wrap_style(node, &self.palette, &candidates)
    }

    fn take_align(
        &self,
        args: &mut Arguments,
        widget: &'static str,
        default: Align,
    ) -> UiResult<Align> {
        match args.take_text("align", widget, self.line)? {
            None => Ok(default),
            Some(name) => Align::from_name(&name).ok_or_else(|| {
                SyntaxError::InvalidArgument {
                    name: "align".to_string(),
                    widget,
                    expected: "left, center or right",
                    line: self.line,
                }
                .into()
            }),
        }
    }

    // ===== Leaf parsers =====

    fn text_widget(&mut self, data: &str, class: &str) -> UiResult<WidgetId> {
        let (text, rest) = split_text(data);
        let (attrs, mut args) = parse_attributes(rest, self.line)?;
        let align = self.take_align(&mut args, "Text", Align::Left)?;
        args.finish("Text", self.line)?;
        let widget = Widget::Text(Text {
            text: text.to_string(),
            align,
        });
        self.add_widget(widget, attrs, class, self.line)
    }

    fn parse_header(&mut self, data: &str) -> UiResult<()> {
        if self.header.is_some() {
            return Err(SyntaxError::DuplicateHeader { line: self.line }.into());
        }
        self.header = Some(self.text_widget(data, "header")?);
        Ok(())
    }

    fn parse_footer(&mut self, data: &str) -> UiResult<()> {
        if self.footer.is_some() {
            return Err(SyntaxError::DuplicateFooter { line: self.line }.into());
        }
        self.footer = Some(self.text_widget(data, "footer")?);
        Ok(())
    }

    fn parse_text(&mut self, data: &str) -> UiResult<()> {
        let id = self.text_widget(data, "Text")?;
        self.content.push(id);
        Ok(())
    }

    fn parse_button(&mut self, data: &str) -> UiResult<()> {
        let (label, rest) = bracketed(data)
            .filter(|(label, _)| !label.is_empty())
            .ok_or_else(|| SyntaxError::MalformedButton {
                text: data.to_string(),
                line: self.line,
            })?;
        let (attrs, args) = parse_attributes(rest, self.line)?;
        args.finish("Button", self.line)?;
        let widget = Widget::Button(Button {
            label: label.to_string(),
        });
        let id = self.add_widget(widget, attrs, "Button", self.line)?;
        self.content.push(id);
        Ok(())
    }

    fn parse_edit(&mut self, data: &str) -> UiResult<()> {
        let malformed = || SyntaxError::MalformedEdit {
            text: data.to_string(),
            line: self.line,
        };
        let open = data.find('[').ok_or_else(malformed)?;
        let caption = &data[..open];
        let after = &data[open + 1..];
        let close = after.find(']').ok_or_else(malformed)?;
        let text = &after[..close];
        let rest = &after[close + 1..];

        let (attrs, mut args) = parse_attributes(rest, self.line)?;
        let multiline = args
            .take_bool("multiline", "Edit", self.line)?
            .unwrap_or(false);
        args.finish("Edit", self.line)?;

        let mut edit = Edit::new(caption, text);
        edit.multiline = multiline;
        let id = self.add_widget(Widget::Edit(edit), attrs, "Edit", self.line)?;
        self.content.push(id);
        Ok(())
    }

    fn parse_checkbox(&mut self, data: &str) -> UiResult<()> {
        let (label, rest) = bracketed(data).ok_or_else(|| SyntaxError::MalformedButton {
            text: data.to_string(),
            line: self.line,
        })?;
        let (attrs, mut args) = parse_attributes(rest, self.line)?;
        let state = args
            .take_bool("state", "CheckBox", self.line)?
            .unwrap_or(false);
        args.finish("CheckBox", self.line)?;

        let widget = Widget::CheckBox(CheckBox {
            label: label.to_string(),
            state,
        });
        let id = self.add_widget(widget, attrs, "CheckBox", self.line)?;
        self.content.push(id);
        Ok(())
    }

    fn parse_radio(&mut self, data: &str) -> UiResult<()> {
        let (label, rest) = bracketed(data).ok_or_else(|| SyntaxError::MalformedButton {
            text: data.to_string(),
            line: self.line,
        })?;
        let (attrs, mut args) = parse_attributes(rest, self.line)?;
        let group = args.take_text("group", "RadioButton", self.line)?;
        let state = args
            .take_bool("state", "RadioButton", self.line)?
            .unwrap_or(false);
        args.finish("RadioButton", self.line)?;

        let widget = Widget::RadioButton(RadioButton {
            label: label.to_string(),
            state,
            group: group.clone(),
        });
        let id = self.add_widget(widget, attrs, "RadioButton", self.line)?;
        if let (true, Some(group)) = (state, group) {
            let radio = self.tree.unwrap(id);
            self.tree.clear_radio_group(radio, &group);
        }
        self.content.push(id);
        Ok(())
    }

    fn divider(&mut self, fill: char, attrs: UiAttributes, mut args: Arguments) -> UiResult<()> {
        let mut divider = Divider::new(fill);
        divider.top = args.take_usize("top", "Divider", self.line)?.unwrap_or(0);
        divider.bottom = args.take_usize("bottom", "Divider", self.line)?.unwrap_or(0);
        args.finish("Divider", self.line)?;
        let id = self.add_widget(Widget::Divider(divider), attrs, "Divider", self.line)?;
        self.content.push(id);
        Ok(())
    }

    fn parse_divider(&mut self, data: &str) -> UiResult<()> {
        let (attrs, mut args) = parse_attributes(data, self.line)?;
        let fill = match args.take_positional() {
            None => ' ',
            Some(lit) => lit
                .as_text()
                .and_then(|s| s.chars().next())
                .ok_or_else(|| SyntaxError::InvalidArgument {
                    name: lit.to_string(),
                    widget: "Divider",
                    expected: "a fill character",
                    line: self.line,
                })?,
        };
        self.divider(fill, attrs, args)
    }

    /// `---`, `===`, `:::`: a divider filled with the repeated character
    fn parse_divider_shorthand(&mut self, fill: char, data: &str) -> UiResult<()> {
        let data = data.trim_start_matches(fill);
        let (attrs, args) = parse_attributes(data, self.line)?;
        if !args.positional.is_empty() {
            return Err(SyntaxError::UnsupportedArgument {
                name: args.positional[0].to_string(),
                widget: "Divider",
                line: self.line,
            }
            .into());
        }
        self.divider(fill, attrs, args)
    }

    // ===== Containers =====

    fn open(&mut self, kind: ContainerKind, data: &str) -> UiResult<()> {
        let (attrs, args) = parse_attributes(data, self.line)?;
        let parent_content = std::mem::take(&mut self.content);
        self.stack.push(ContainerFrame {
            kind,
            parent_content,
            attrs,
            args,
            line: self.line,
        });
        debug!(line = self.line, ?kind, depth = self.stack.depth(), "open container");
        Ok(())
    }

    fn parse_pile(&mut self, data: &str) -> UiResult<()> {
        self.open(ContainerKind::Pile, data)
    }

    fn parse_columns(&mut self, data: &str) -> UiResult<()> {
        self.open(ContainerKind::Columns, data)
    }

    fn parse_grid_flow(&mut self, data: &str) -> UiResult<()> {
        self.open(ContainerKind::GridFlow, data)
    }

    fn parse_list_box(&mut self, data: &str) -> UiResult<()> {
        self.open(ContainerKind::ListBox, data)
    }

    fn parse_end(&mut self, data: &str) -> UiResult<()> {
        if !data.is_empty() {
            return Err(SyntaxError::EndWithArguments {
                text: data.to_string(),
                line: self.line,
            }
            .into());
        }
        let frame = self
            .stack
            .pop()
            .ok_or(SyntaxError::UnbalancedEnd { line: self.line })?;
        let children = std::mem::replace(&mut self.content, frame.parent_content);
        debug!(line = self.line, kind = ?frame.kind, children = children.len(), "close container");

        let mut args = frame.args;
        let line = frame.line;
        let focus = self.tree.first_selectable(&children);
        let widget = match frame.kind {
            ContainerKind::Pile => Widget::Pile(Pile { children, focus }),
            ContainerKind::Columns => {
                let dividechars = args.take_usize("dividechars", "Columns", line)?.unwrap_or(0);
                Widget::Columns(Columns {
                    widths: vec![ColumnWidth::Weight(1); children.len()],
                    children,
                    dividechars: u16::try_from(dividechars).unwrap_or(u16::MAX),
                    focus,
                })
            }
            ContainerKind::GridFlow => self.end_grid_flow(children, &mut args, line, focus)?,
            ContainerKind::ListBox => {
                let height = args.take_usize("height", "ListBox", line)?;
                let border = args.take_bool("border", "ListBox", line)?.unwrap_or(false);
                Widget::ListBox(ListBox {
                    children,
                    height: height.map(|h| u16::try_from(h).unwrap_or(u16::MAX)),
                    border,
                    focus,
                })
            }
        };
        args.finish(frame.kind.class(), line)?;

        let id = self.add_widget(widget, frame.attrs, frame.kind.class(), line)?;
        self.content.push(id);
        Ok(())
    }

    /// Uniform cells as wide as the widest child label or text plus a margin
    fn end_grid_flow(
        &self,
        children: Vec<WidgetId>,
        args: &mut Arguments,
        line: usize,
        focus: usize,
    ) -> UiResult<Widget> {
        let widest = children
            .iter()
            .map(|&child| {
                let widget = self.tree.widget(self.tree.unwrap(child));
                let text = widget.text().map(|t| display_width(&t)).unwrap_or(0);
                let label = widget.label().map(display_width).unwrap_or(0);
                text.max(label)
            })
            .max()
            .unwrap_or(0);

        let cell_width = args
            .take_usize("cell_width", "GridFlow", line)?
            .unwrap_or(widest + GRID_FLOW_MARGIN);
        let h_sep = args.take_usize("h_sep", "GridFlow", line)?.unwrap_or(1);
        let v_sep = args.take_usize("v_sep", "GridFlow", line)?.unwrap_or(1);
        let align = match args.take_text("align", "GridFlow", line)? {
            None => Align::Center,
            Some(name) => Align::from_name(&name).ok_or(SyntaxError::InvalidArgument {
                name: "align".to_string(),
                widget: "GridFlow",
                expected: "left, center or right",
                line,
            })?,
        };

        let narrow = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
        Ok(Widget::GridFlow(GridFlow {
            children,
            cell_width: narrow(cell_width),
            h_sep: narrow(h_sep),
            v_sep: narrow(v_sep),
            align,
            focus,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UiError;

    fn build(description: &str) -> UiResult<Ui> {
        TreeBuilder::build(description, Rc::new(Palette::default()), StringTable::new())
    }

    fn build_styled(palette: &str, description: &str) -> Ui {
        let palette = Rc::new(Palette::parse(palette).unwrap());
        TreeBuilder::build(description, palette, StringTable::new()).unwrap()
    }

    fn body_children(ui: &Ui) -> Vec<WidgetId> {
        ui.tree()
            .widget(ui.body())
            .as_container()
            .unwrap()
            .children()
            .to_vec()
    }

    #[test]
    fn test_leaves_in_order() {
        let ui = build("Txt Hello\n\nBtn [OK] #ok\nEdt Name [me] #name").unwrap();
        let children = body_children(&ui);
        assert_eq!(children.len(), 4);

        let kinds: Vec<&str> = children
            .iter()
            .map(|&c| ui.tree().widget(c).kind_name())
            .collect();
        assert_eq!(kinds, vec!["Text", "Text", "Button", "Edit"]);
        assert_eq!(ui.edit_text("name").unwrap(), "me");
        assert_eq!(ui.label("ok").unwrap(), "OK");
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let ui = build("# a comment\nTxt Visible").unwrap();
        assert_eq!(body_children(&ui).len(), 1);
    }

    #[test]
    fn test_text_args_separator() {
        let ui = build("Txt Hello World !        args:#txt_hello align=center").unwrap();
        let id = ui.widget("txt_hello").unwrap();
        match ui.tree().widget(id) {
            Widget::Text(text) => {
                assert_eq!(text.text, "Hello World !");
                assert_eq!(text.align, Align::Center);
            }
            other => panic!("Expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_dash_shorthand_is_one_empty_divider() {
        let ui = build("---").unwrap();
        let children = body_children(&ui);
        assert_eq!(children.len(), 1);
        match ui.tree().widget(children[0]) {
            Widget::Divider(divider) => {
                assert_eq!(divider.fill, '-');
                assert_eq!(divider.caption, "");
            }
            other => panic!("Expected divider, got {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_with_style_and_long_run() {
        let ui = build_styled("shade : DC, Lg, BO", "::: @shade\n==========");
        let children = body_children(&ui);
        assert_eq!(children.len(), 2);
        assert!(matches!(ui.tree().widget(children[0]), Widget::AttrMap(_)));
        assert!(matches!(
            ui.tree().widget(children[1]),
            Widget::Divider(Divider { fill: '=', .. })
        ));
    }

    #[test]
    fn test_unrecognized_widget_has_line() {
        let err = build("Txt ok\nXyz nope").unwrap_err();
        assert!(matches!(
            err,
            UiError::Syntax(SyntaxError::UnrecognizedWidget { ref opcode, line: 2 }) if opcode == "Xyz"
        ));
    }

    #[test]
    fn test_nested_containers() {
        let ui = build("Ple #outer\nTxt a\nGFl #grid\nBtn [A]\nBtn [B]\nEnd\nEnd").unwrap();
        let outer = ui.widget("outer").unwrap();
        let grid = ui.widget("grid").unwrap();
        assert_eq!(body_children(&ui), vec![outer]);

        let pile = ui.tree().widget(outer).as_container().unwrap();
        assert_eq!(pile.children().len(), 2);
        assert_eq!(pile.children()[1], grid);
        // Focus starts on the first child that can take it
        assert_eq!(pile.focus_index(), 1);
    }

    #[test]
    fn test_unbalanced_end() {
        let err = build("Txt a\nEnd").unwrap_err();
        assert!(matches!(
            err,
            UiError::Syntax(SyntaxError::UnbalancedEnd { line: 2 })
        ));
    }

    #[test]
    fn test_unclosed_container() {
        let err = build("Ple\nGFl\nEnd").unwrap_err();
        assert!(matches!(
            err,
            UiError::Syntax(SyntaxError::UnclosedContainer { depth: 1 })
        ));
    }

    #[test]
    fn test_end_takes_no_argument() {
        assert!(matches!(
            build("Ple\nEnd now").unwrap_err(),
            UiError::Syntax(SyntaxError::EndWithArguments { .. })
        ));
    }

    #[test]
    fn test_grid_flow_defaults() {
        let ui = build("GFl #grid\nBtn [Cancel]\nBtn [OK]\nTxt Much longer text\nEnd").unwrap();
        match ui.tree().widget(ui.widget("grid").unwrap()) {
            Widget::GridFlow(grid) => {
                assert_eq!(grid.cell_width as usize, "Much longer text".len() + 4);
                assert_eq!(grid.h_sep, 1);
                assert_eq!(grid.v_sep, 1);
                assert_eq!(grid.align, Align::Center);
            }
            other => panic!("Expected grid flow, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_flow_overrides() {
        let ui = build("GFl #grid cell_width=20, h_sep=3, align=left\nBtn [OK]\nEnd").unwrap();
        match ui.tree().widget(ui.widget("grid").unwrap()) {
            Widget::GridFlow(grid) => {
                assert_eq!(grid.cell_width, 20);
                assert_eq!(grid.h_sep, 3);
                assert_eq!(grid.v_sep, 1);
                assert_eq!(grid.align, Align::Left);
            }
            other => panic!("Expected grid flow, got {:?}", other),
        }
    }

    #[test]
    fn test_second_header_fails() {
        let err = build("Hdr One\nHdr Two").unwrap_err();
        assert!(matches!(
            err,
            UiError::Syntax(SyntaxError::DuplicateHeader { line: 2 })
        ));
    }

    #[test]
    fn test_duplicate_id() {
        let err = build("Btn [A] #same\nBtn [B] #same").unwrap_err();
        assert!(matches!(
            err,
            UiError::Runtime(RuntimeError::DuplicateId { ref id }) if id == "same"
        ));
    }

    #[test]
    fn test_binding_capabilities_checked_at_parse_time() {
        let err = build("Txt Label args:&press=save").unwrap_err();
        assert!(matches!(
            err,
            UiError::Runtime(RuntimeError::BindingMismatch { event: "press", widget: "Text", line: 1 })
        ));

        let err = build("Btn [OK] &edit=changed").unwrap_err();
        assert!(matches!(
            err,
            UiError::Runtime(RuntimeError::BindingMismatch { event: "edit", widget: "Button", .. })
        ));

        assert!(build("Edt [x] &edit=changed &key=keys").is_ok());
    }

    #[test]
    fn test_malformed_button_and_edit() {
        assert!(matches!(
            build("Btn OK").unwrap_err(),
            UiError::Syntax(SyntaxError::MalformedButton { .. })
        ));
        assert!(matches!(
            build("Btn []").unwrap_err(),
            UiError::Syntax(SyntaxError::MalformedButton { .. })
        ));
        assert!(matches!(
            build("Edt Name [unclosed").unwrap_err(),
            UiError::Syntax(SyntaxError::MalformedEdit { .. })
        ));
    }

    #[test]
    fn test_edit_may_start_empty() {
        let ui = build("Edt Name [] #name").unwrap();
        assert_eq!(ui.edit_text("name").unwrap(), "");
        assert_eq!(ui.text("name").unwrap(), "Name ");
    }

    #[test]
    fn test_edit_arguments() {
        let ui = build("Edt [Content] #content multiline=True").unwrap();
        let id = ui.widget("content").unwrap();
        match ui.tree().widget(id) {
            Widget::Edit(edit) => {
                assert!(edit.multiline);
                assert_eq!(edit.caption, "");
                assert_eq!(edit.text, "Content");
            }
            other => panic!("Expected edit, got {:?}", other),
        }
        assert!(matches!(
            build("Edt [x] colour=1").unwrap_err(),
            UiError::Syntax(SyntaxError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_style_resolution_order() {
        let palette = "
#ok     : WH, DB, BO
primary: WH, DR, BO
Button : BL, Lg, SO
Button*: WH, DM, BO
";
        let ui = build_styled(palette, "Btn [OK] #ok @primary\nBtn [Go] @primary\nBtn [Plain]\nTxt bare");
        let names: Vec<Option<(Option<String>, Option<String>)>> = body_children(&ui)
            .iter()
            .map(|&c| match ui.tree().widget(c) {
                Widget::AttrMap(map) => Some((map.names.normal.clone(), map.names.focus.clone())),
                _ => None,
            })
            .collect();

        let pair = |a: &str, b: &str| Some((Some(a.to_string()), Some(b.to_string())));
        assert_eq!(names[0], pair("#ok", "Button*"));
        assert_eq!(names[1], pair("primary", "Button*"));
        assert_eq!(names[2], pair("Button", "Button*"));
        assert_eq!(names[3], None);
    }

    #[test]
    fn test_registry_points_at_unwrapped_widget() {
        let ui = build_styled("Button : BL, Lg, SO", "Btn [OK] #ok");
        let ok = ui.widget("ok").unwrap();
        assert!(matches!(ui.tree().widget(ok), Widget::Button(_)));
    }

    #[test]
    fn test_frame_style_wraps_body() {
        let ui = build_styled("Frame : Dg, _, SO", "Txt a");
        assert_ne!(ui.root(), ui.body());
        assert_eq!(ui.tree().unwrap(ui.root()), ui.body());
    }

    #[test]
    fn test_info_key_must_exist() {
        let err = build("Edt From [me] #from ?FROM").unwrap_err();
        assert!(matches!(
            err,
            UiError::Runtime(RuntimeError::UndefinedString { ref key }) if key == "FROM"
        ));

        let strings = StringTable::from_pairs([("FROM", "Your email address")]).unwrap();
        let ui = TreeBuilder::build(
            "Edt From [me] #from ?FROM",
            Rc::new(Palette::default()),
            strings,
        )
        .unwrap();
        let from = ui.widget("from").unwrap();
        assert_eq!(ui.tree().node(from).meta.info.as_deref(), Some("FROM"));
    }

    #[test]
    fn test_template_substitution_before_parse() {
        let strings = StringTable::from_pairs([("ME", "me@example.com")]).unwrap();
        let ui = TreeBuilder::build("Edt From [${ME}] #from", Rc::new(Palette::default()), strings)
            .unwrap();
        assert_eq!(ui.edit_text("from").unwrap(), "me@example.com");
    }

    #[test]
    fn test_radio_and_checkbox() {
        let ui = build(
            "Chc [Urgent] #urgent state=True\nRdo [Small] #small group=size state=True\nRdo [Large] #large group=size state=True",
        )
        .unwrap();
        let state = |id: &str| match ui.tree().widget(ui.widget(id).unwrap()) {
            Widget::CheckBox(c) => c.state,
            Widget::RadioButton(r) => r.state,
            _ => unreachable!(),
        };
        assert!(state("urgent"));
        assert!(!state("small"));
        assert!(state("large"));
    }

    #[test]
    fn test_list_box_arguments() {
        let ui = build("Box #box height=3, border=1\nEdt [Content]\nEnd").unwrap();
        match ui.tree().widget(ui.widget("box").unwrap()) {
            Widget::ListBox(list) => {
                assert_eq!(list.height, Some(3));
                assert!(list.border);
            }
            other => panic!("Expected list box, got {:?}", other),
        }
    }
}
