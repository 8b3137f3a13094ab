//! Default keypress behaviour
//!
//! A key first goes to the focused leaf, then bubbles up through each enclosing
//! container until one of them uses it:
//!
//! - buttons, checkboxes and radio buttons report a press on Enter or Space
//! - edits insert characters and move their cursor
//! - piles and list boxes move focus with Up/Down, columns and grid flows with
//!   Left/Right, always skipping children that cannot take focus

use super::{Widget, WidgetId, WidgetTree};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the widget kit did with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    /// A clickable widget was activated and should fire its press binding
    Pressed(WidgetId),
    Unhandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Vertical,
    Horizontal,
}

impl WidgetTree {
    /// Offer `key` to the focused path below `id`
    pub fn keypress(&mut self, id: WidgetId, key: KeyEvent) -> KeyOutcome {
        if let Some(wrapper) = self.widget(id).as_wrapper() {
            let inner = wrapper.inner();
            return self.keypress(inner, key);
        }

        if let Some(container) = self.widget(id).as_container() {
            if let Some(child) = container.focused_child() {
                let outcome = self.keypress(child, key);
                if outcome != KeyOutcome::Unhandled {
                    return outcome;
                }
            }
            return self.navigate(id, key);
        }

        match self.widget(id) {
            Widget::Button(_) | Widget::CheckBox(_) | Widget::RadioButton(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.activate(id);
                    KeyOutcome::Pressed(id)
                } else {
                    KeyOutcome::Unhandled
                }
            }
            Widget::Edit(_) => self.edit_keypress(id, key),
            _ => KeyOutcome::Unhandled,
        }
    }

    fn navigate(&mut self, id: WidgetId, key: KeyEvent) -> KeyOutcome {
        let axis = match self.widget(id) {
            Widget::Pile(_) | Widget::ListBox(_) => Axis::Vertical,
            Widget::Columns(_) | Widget::GridFlow(_) => Axis::Horizontal,
            _ => return KeyOutcome::Unhandled,
        };
        let forward = match (axis, key.code) {
            (Axis::Vertical, KeyCode::Down) | (Axis::Horizontal, KeyCode::Right) => true,
            (Axis::Vertical, KeyCode::Up) | (Axis::Horizontal, KeyCode::Left) => false,
            _ => return KeyOutcome::Unhandled,
        };

        let Some(container) = self.widget(id).as_container() else {
            return KeyOutcome::Unhandled;
        };
        let children = container.children().to_vec();
        let current = container.focus_index();

        let candidates: Box<dyn Iterator<Item = usize>> = if forward {
            Box::new(current + 1..children.len())
        } else {
            Box::new((0..current.min(children.len())).rev())
        };
        for index in candidates {
            if self.is_selectable(children[index]) {
                if let Some(container) = self.widget_mut(id).as_container_mut() {
                    container.set_focus_index(index);
                }
                return KeyOutcome::Consumed;
            }
        }
        KeyOutcome::Unhandled
    }

    fn edit_keypress(&mut self, id: WidgetId, key: KeyEvent) -> KeyOutcome {
        let Widget::Edit(edit) = self.widget_mut(id) else {
            return KeyOutcome::Unhandled;
        };
        let len = edit.text.chars().count();
        edit.cursor = edit.cursor.min(len);
        let byte_at = |text: &str, cursor: usize| {
            text.char_indices()
                .nth(cursor)
                .map(|(i, _)| i)
                .unwrap_or(text.len())
        };

        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = byte_at(&edit.text, edit.cursor);
                edit.text.insert(at, c);
                edit.cursor += 1;
            }
            KeyCode::Enter if edit.multiline => {
                let at = byte_at(&edit.text, edit.cursor);
                edit.text.insert(at, '\n');
                edit.cursor += 1;
            }
            KeyCode::Backspace if edit.cursor > 0 => {
                edit.cursor -= 1;
                let at = byte_at(&edit.text, edit.cursor);
                edit.text.remove(at);
            }
            KeyCode::Delete if edit.cursor < len => {
                let at = byte_at(&edit.text, edit.cursor);
                edit.text.remove(at);
            }
            KeyCode::Left if edit.cursor > 0 => edit.cursor -= 1,
            KeyCode::Right if edit.cursor < len => edit.cursor += 1,
            KeyCode::Home => edit.cursor = 0,
            KeyCode::End => edit.cursor = len,
            _ => return KeyOutcome::Unhandled,
        }
        KeyOutcome::Consumed
    }
}
