//! Drawing the widget tree
//!
//! Stateless functions in the spirit of the pane renderers: [`rows`] measures
//! a widget at a given width and [`render`] paints it into a ratatui
//! [`Buffer`]. Every widget stays inside the area it is given, so a parent
//! clips a child simply by handing it a shorter rect.
//!
//! `focused` is true for widgets on the focus path. Containers pass it on to
//! their focused child only; style wrappers use it to pick their focus style.

use super::dialog::Dialog;
use super::theme::{DEFAULT_THEME, INFO_STYLE, TOOLTIP_STYLE};
use super::Ui;
use crate::style::StyleRule;
use crate::widget::{
    display_width, Align, ColumnWidth, Columns, GridFlow, ListBox, Widget, WidgetId, WidgetTree,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Widget as _},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Transient footer text for one render
#[derive(Debug, Clone, Copy, Default)]
pub struct FooterText<'a> {
    pub info: Option<&'a str>,
    pub tooltip: Option<&'a str>,
}

impl FooterText<'_> {
    pub fn is_empty(&self) -> bool {
        self.info.is_none() && self.tooltip.is_none()
    }
}

fn clamp(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Wrap `text` at `width` columns, also returning the (row, column) of every
/// character plus one position past the end
fn wrap_positions(text: &str, width: u16) -> (Vec<String>, Vec<(usize, usize)>) {
    let width = usize::from(width.max(1));
    let mut lines = vec![String::new()];
    let mut positions = Vec::with_capacity(text.len() + 1);
    let mut used = 0;

    for ch in text.chars() {
        if ch == '\n' {
            positions.push((lines.len() - 1, used));
            lines.push(String::new());
            used = 0;
            continue;
        }
        let w = ch.width().unwrap_or(0);
        if used + w > width && used > 0 {
            lines.push(String::new());
            used = 0;
        }
        let row = lines.len() - 1;
        positions.push((row, used));
        lines[row].push(ch);
        used += w;
    }

    let end = if used >= width {
        (lines.len(), 0)
    } else {
        (lines.len() - 1, used)
    };
    positions.push(end);
    (lines, positions)
}

fn wrap(text: &str, width: u16) -> Vec<String> {
    wrap_positions(text, width).0
}

fn put_lines(buf: &mut Buffer, area: Rect, lines: &[String], align: Align, style: Style) {
    for (row, line) in lines.iter().enumerate().take(usize::from(area.height)) {
        let used = clamp(display_width(line));
        let x = area.x + align.offset(area.width, used);
        let max = usize::from(area.right().saturating_sub(x));
        buf.set_stringn(x, area.y + clamp(row), line, max, style);
    }
}

fn clickable_label(widget: &Widget) -> Option<String> {
    match widget {
        Widget::Button(b) => Some(format!("< {} >", b.label)),
        Widget::CheckBox(c) => Some(format!("[{}] {}", if c.state { 'X' } else { ' ' }, c.label)),
        Widget::RadioButton(r) => Some(format!("({}) {}", if r.state { 'X' } else { ' ' }, r.label)),
        _ => None,
    }
}

fn edit_content(widget: &Widget) -> Option<String> {
    match widget {
        Widget::Edit(e) => Some(format!("{}{}", e.caption, e.text)),
        _ => None,
    }
}

fn column_widths(columns: &Columns, width: u16) -> Vec<u16> {
    let count = columns.children.len();
    if count == 0 {
        return Vec::new();
    }
    let width_of = |i: usize| {
        columns
            .widths
            .get(i)
            .copied()
            .unwrap_or(ColumnWidth::Weight(1))
    };
    let dividers = columns.dividechars.saturating_mul(clamp(count - 1));
    let available = width.saturating_sub(dividers);

    let fixed: u16 = (0..count)
        .filter_map(|i| match width_of(i) {
            ColumnWidth::Fixed(w) => Some(w),
            ColumnWidth::Weight(_) => None,
        })
        .fold(0u16, u16::saturating_add);
    let total_weight: u32 = (0..count)
        .map(|i| match width_of(i) {
            ColumnWidth::Weight(w) => u32::from(w),
            ColumnWidth::Fixed(_) => 0,
        })
        .sum();
    let flexible = available.saturating_sub(fixed);
    let last_weighted = (0..count).rev().find(|&i| matches!(width_of(i), ColumnWidth::Weight(_)));

    let mut given = 0u16;
    let mut widths = Vec::with_capacity(count);
    for i in 0..count {
        let w = match width_of(i) {
            ColumnWidth::Fixed(w) => w.min(available.saturating_sub(given)),
            // The last weighted column takes the rounding remainder
            ColumnWidth::Weight(_) if Some(i) == last_weighted => {
                let fixed_after: u16 = (i + 1..count)
                    .filter_map(|j| match width_of(j) {
                        ColumnWidth::Fixed(w) => Some(w),
                        ColumnWidth::Weight(_) => None,
                    })
                    .fold(0u16, u16::saturating_add);
                available.saturating_sub(given).saturating_sub(fixed_after)
            }
            ColumnWidth::Weight(weight) if total_weight > 0 => {
                clamp((u32::from(flexible) * u32::from(weight) / total_weight) as usize)
            }
            ColumnWidth::Weight(_) => 0,
        };
        given = given.saturating_add(w);
        widths.push(w);
    }
    widths
}

/// Cells per row and the width of one cell
fn grid_shape(grid: &GridFlow, width: u16) -> (usize, u16) {
    let cell = grid.cell_width.max(1).min(width.max(1));
    let per_row =
        (usize::from(width) + usize::from(grid.h_sep)) / (usize::from(cell) + usize::from(grid.h_sep));
    (per_row.max(1), cell)
}

fn list_heights(tree: &WidgetTree, list: &ListBox, width: u16) -> Vec<u16> {
    list.children
        .iter()
        .map(|&child| rows(tree, child, width))
        .collect()
}

/// Natural height of `id` at `width`
pub fn rows(tree: &WidgetTree, id: WidgetId, width: u16) -> u16 {
    let widget = tree.widget(id);
    match widget {
        Widget::Text(t) => clamp(wrap(&t.text, width).len()),
        Widget::Button(_) | Widget::CheckBox(_) | Widget::RadioButton(_) => 1,
        Widget::Edit(_) => {
            let content = edit_content(widget).unwrap_or_default();
            clamp(wrap(&content, width).len())
        }
        Widget::Divider(d) => clamp(d.top + 1 + d.bottom),
        Widget::Pile(p) => p
            .children
            .iter()
            .map(|&child| rows(tree, child, width))
            .fold(0, u16::saturating_add),
        Widget::Columns(c) => c
            .children
            .iter()
            .zip(column_widths(c, width))
            .map(|(&child, w)| rows(tree, child, w))
            .max()
            .unwrap_or(0),
        Widget::GridFlow(g) => {
            let (per_row, cell) = grid_shape(g, width);
            let mut total = 0u16;
            for (index, chunk) in g.children.chunks(per_row).enumerate() {
                if index > 0 {
                    total = total.saturating_add(g.v_sep);
                }
                let height = chunk
                    .iter()
                    .map(|&child| rows(tree, child, cell))
                    .max()
                    .unwrap_or(0);
                total = total.saturating_add(height);
            }
            total
        }
        Widget::ListBox(l) => {
            let border = if l.border { 2 } else { 0 };
            let inner = width.saturating_sub(border);
            let content = l
                .height
                .unwrap_or_else(|| list_heights(tree, l, inner).into_iter().fold(0, u16::saturating_add));
            content.saturating_add(border)
        }
        Widget::Padding(p) => rows(tree, p.child, width.saturating_sub(p.left + p.right)),
        Widget::AttrMap(m) => rows(tree, m.child, width),
    }
}

/// Paint `id` into `area`
pub fn render(tree: &WidgetTree, id: WidgetId, area: Rect, buf: &mut Buffer, focused: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let widget = tree.widget(id);
    match widget {
        Widget::Text(t) => put_lines(buf, area, &wrap(&t.text, area.width), t.align, Style::default()),
        Widget::Button(_) | Widget::CheckBox(_) | Widget::RadioButton(_) => {
            let label = clickable_label(widget).unwrap_or_default();
            let style = if focused {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            put_lines(buf, area, &[label], Align::Left, style);
        }
        Widget::Edit(e) => {
            let content = edit_content(widget).unwrap_or_default();
            let (lines, positions) = wrap_positions(&content, area.width);
            put_lines(buf, area, &lines, Align::Left, Style::default());
            if focused {
                let at = (e.caption.chars().count() + e.cursor).min(positions.len() - 1);
                let (row, col) = positions[at];
                let (row, col) = (clamp(row), clamp(col));
                if row < area.height && col < area.width {
                    buf.set_style(
                        Rect::new(area.x + col, area.y + row, 1, 1),
                        Style::default()
                            .fg(DEFAULT_THEME.cursor)
                            .add_modifier(Modifier::REVERSED),
                    );
                }
            }
        }
        Widget::Divider(d) => {
            let row = clamp(d.top);
            if row >= area.height {
                return;
            }
            let fill_width = d.fill.width().unwrap_or(1).max(1);
            let line: String = std::iter::repeat(d.fill)
                .take(usize::from(area.width) / fill_width)
                .collect();
            let line_area = Rect::new(area.x, area.y + row, area.width, 1);
            put_lines(buf, line_area, &[line], Align::Left, Style::default());
            if !d.caption.is_empty() {
                let caption = format!(" {} ", d.caption);
                put_lines(buf, line_area, &[caption], Align::Center, Style::default());
            }
        }
        Widget::Pile(p) => {
            let mut y = area.y;
            for (index, &child) in p.children.iter().enumerate() {
                if y >= area.bottom() {
                    break;
                }
                let height = rows(tree, child, area.width).min(area.bottom() - y);
                let child_area = Rect::new(area.x, y, area.width, height);
                render(tree, child, child_area, buf, focused && index == p.focus);
                y += height;
            }
        }
        Widget::Columns(c) => {
            let mut x = area.x;
            for (index, (&child, width)) in c
                .children
                .iter()
                .zip(column_widths(c, area.width))
                .enumerate()
            {
                if x >= area.right() {
                    break;
                }
                let width = width.min(area.right() - x);
                let child_area = Rect::new(x, area.y, width, area.height);
                render(tree, child, child_area, buf, focused && index == c.focus);
                x = x.saturating_add(width).saturating_add(c.dividechars);
            }
        }
        Widget::GridFlow(g) => {
            let (per_row, cell) = grid_shape(g, area.width);
            let mut y = area.y;
            for (row, chunk) in g.children.chunks(per_row).enumerate() {
                if y >= area.bottom() {
                    break;
                }
                let count = clamp(chunk.len());
                let used = cell
                    .saturating_mul(count)
                    .saturating_add(g.h_sep.saturating_mul(count - 1));
                let mut x = area.x + g.align.offset(area.width, used);
                let height = chunk
                    .iter()
                    .map(|&child| rows(tree, child, cell))
                    .max()
                    .unwrap_or(0)
                    .min(area.bottom() - y);
                for (column, &child) in chunk.iter().enumerate() {
                    let width = cell.min(area.right().saturating_sub(x));
                    let index = row * per_row + column;
                    render(
                        tree,
                        child,
                        Rect::new(x, y, width, height),
                        buf,
                        focused && index == g.focus,
                    );
                    x = x.saturating_add(cell).saturating_add(g.h_sep);
                }
                y = y.saturating_add(height).saturating_add(g.v_sep);
            }
        }
        Widget::ListBox(l) => {
            let inner = if l.border {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(DEFAULT_THEME.border));
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            } else {
                area
            };
            let heights = list_heights(tree, l, inner.width);

            // Scroll by whole children until the focused one fits
            let mut start = 0;
            if l.focus < heights.len() {
                let mut bottom: u32 = heights[..=l.focus].iter().map(|&h| u32::from(h)).sum();
                while bottom > u32::from(inner.height) && start < l.focus {
                    bottom -= u32::from(heights[start]);
                    start += 1;
                }
            }

            let mut y = inner.y;
            for (index, &child) in l.children.iter().enumerate().skip(start) {
                if y >= inner.bottom() {
                    break;
                }
                let height = heights[index].min(inner.bottom() - y);
                let child_area = Rect::new(inner.x, y, inner.width, height);
                render(tree, child, child_area, buf, focused && index == l.focus);
                y += height;
            }
        }
        Widget::Padding(p) => {
            let inner = Rect::new(
                area.x.saturating_add(p.left).min(area.right()),
                area.y,
                area.width.saturating_sub(p.left + p.right),
                area.height,
            );
            render(tree, p.child, inner, buf, focused);
        }
        Widget::AttrMap(m) => {
            buf.set_style(area, if focused { m.focus_style } else { m.style });
            render(tree, m.child, area, buf, focused);
        }
    }
}

fn named_style(ui: &Ui, name: &str, fallback: Style) -> Style {
    ui.palette()
        .get(name)
        .map(StyleRule::style)
        .unwrap_or(fallback)
}

/// Centered rect for a dialog: its configured size, or its natural height
/// when none was given, clipped to the screen
pub fn dialog_area(dialog: &Dialog, screen: Rect) -> Rect {
    let width = dialog.width().min(screen.width);
    let height = dialog
        .height()
        .unwrap_or_else(|| rows(dialog.ui().tree(), dialog.view(), width))
        .min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

/// Header, body and footer of the console, with the active dialog composited
/// on top
pub fn draw_console(frame: &mut Frame<'_>, ui: &Ui, dialog: Option<&Dialog>, footer: FooterText<'_>) {
    let area = frame.area();
    let tree = ui.tree();

    let header_rows = ui.header().map_or(0, |h| rows(tree, h, area.width));
    let footer_widget_rows = ui.footer().map_or(0, |f| rows(tree, f, area.width));
    let footer_rows = if footer.is_empty() {
        footer_widget_rows
    } else {
        footer_widget_rows.max(1)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_rows),
            Constraint::Min(0),
            Constraint::Length(footer_rows),
        ])
        .split(area);

    let buf = frame.buffer_mut();
    if let Some(header) = ui.header() {
        render(tree, header, chunks[0], buf, false);
    }
    render(tree, ui.root(), chunks[1], buf, dialog.is_none());

    if footer.is_empty() {
        if let Some(footer_widget) = ui.footer() {
            render(tree, footer_widget, chunks[2], buf, false);
        }
    } else {
        let line = Rect::new(chunks[2].x, chunks[2].y, chunks[2].width, chunks[2].height.min(1));
        Clear.render(line, buf);
        if let Some(info) = footer.info {
            let style = named_style(ui, INFO_STYLE, DEFAULT_THEME.info());
            buf.set_style(line, style);
            put_lines(buf, line, &[info.to_string()], Align::Left, Style::default());
        }
        if let Some(tooltip) = footer.tooltip {
            let style = named_style(ui, TOOLTIP_STYLE, DEFAULT_THEME.tooltip());
            if footer.info.is_none() {
                buf.set_style(line, style);
            }
            put_lines(buf, line, &[tooltip.to_string()], Align::Right, style);
        }
    }

    if let Some(dialog) = dialog {
        let overlay = dialog_area(dialog, area);
        frame.render_widget(Clear, overlay);
        render(dialog.ui().tree(), dialog.view(), overlay, frame.buffer_mut(), true);
    }
}
