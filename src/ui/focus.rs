//! Focus navigator
//!
//! Focus is not stored separately: every container keeps its own focus index
//! and the focused leaf is whatever a descent through those indices reaches.
//! Tab and Shift-Tab move the index of the outermost container only.

use crate::widget::{WidgetId, WidgetTree};
use tracing::trace;

/// Descend through wrappers and each container's focused child until no
/// further descent is possible
pub fn focused_leaf(tree: &WidgetTree, root: WidgetId) -> WidgetId {
    let mut id = root;
    loop {
        let widget = tree.widget(id);
        if let Some(wrapper) = widget.as_wrapper() {
            id = wrapper.inner();
            continue;
        }
        match widget.as_container().and_then(|c| c.focused_child()) {
            Some(child) => id = child,
            None => return id,
        }
    }
}

/// The focused leaf, if it is one of the kinds that take focus
pub fn focused(tree: &WidgetTree, root: WidgetId) -> Option<WidgetId> {
    let leaf = focused_leaf(tree, root);
    tree.widget(leaf).is_focusable().then_some(leaf)
}

/// The first container below `root`, looking through wrappers
pub fn outermost_list(tree: &WidgetTree, root: WidgetId) -> Option<WidgetId> {
    let id = tree.unwrap(root);
    tree.widget(id).as_container().map(|_| id)
}

/// Move focus to the next focusable widget. Returns false at the last one.
pub fn focus_next(tree: &mut WidgetTree, root: WidgetId) -> bool {
    step(tree, root, true)
}

/// Move focus to the previous focusable widget. Returns false at the first one.
pub fn focus_prev(tree: &mut WidgetTree, root: WidgetId) -> bool {
    step(tree, root, false)
}

fn step(tree: &mut WidgetTree, root: WidgetId, forward: bool) -> bool {
    let Some(list) = outermost_list(tree, root) else {
        return false;
    };
    let Some((len, start)) = tree
        .widget(list)
        .as_container()
        .map(|c| (c.children().len(), c.focus_index()))
    else {
        return false;
    };

    let mut index = start;
    loop {
        index = match (forward, index) {
            (true, i) if i + 1 < len => i + 1,
            (false, i) if i > 0 => i - 1,
            _ => break,
        };
        set_focus(tree, list, index);
        if tree.widget(focused_leaf(tree, root)).is_focusable() {
            trace!(from = start, to = index, "focus moved");
            return true;
        }
    }

    // Nothing focusable in that direction: clamp to where we were
    set_focus(tree, list, start);
    false
}

fn set_focus(tree: &mut WidgetTree, list: WidgetId, index: usize) {
    if let Some(container) = tree.widget_mut(list).as_container_mut() {
        container.set_focus_index(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Button, Edit, GridFlow, ListBox, Text, Widget};
    use crate::widget::Align;

    struct Fixture {
        tree: WidgetTree,
        root: WidgetId,
        edit: WidgetId,
        ok: WidgetId,
        cancel: WidgetId,
    }

    /// Text, Edit, Text, GridFlow[OK, Cancel], Text
    fn fixture() -> Fixture {
        let mut tree = WidgetTree::new();
        let title = tree.add_plain(Widget::Text(Text::default()));
        let edit = tree.add_plain(Widget::Edit(Edit::new("Name ", "")));
        let spacer = tree.add_plain(Widget::Text(Text::default()));
        let ok = tree.add_plain(Widget::Button(Button { label: "OK".into() }));
        let cancel = tree.add_plain(Widget::Button(Button {
            label: "Cancel".into(),
        }));
        let grid = tree.add_plain(Widget::GridFlow(GridFlow {
            children: vec![ok, cancel],
            cell_width: 10,
            h_sep: 1,
            v_sep: 1,
            align: Align::Center,
            focus: 0,
        }));
        let trailer = tree.add_plain(Widget::Text(Text::default()));
        let root = tree.add_plain(Widget::ListBox(ListBox {
            children: vec![title, edit, spacer, grid, trailer],
            height: None,
            border: false,
            focus: 1,
        }));
        Fixture {
            tree,
            root,
            edit,
            ok,
            cancel,
        }
    }

    #[test]
    fn test_focused_leaf_descends_containers() {
        let mut f = fixture();
        assert_eq!(focused(&f.tree, f.root), Some(f.edit));

        assert!(focus_next(&mut f.tree, f.root));
        assert_eq!(focused(&f.tree, f.root), Some(f.ok));
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let mut f = fixture();

        assert!(!focus_prev(&mut f.tree, f.root));
        assert_eq!(focused(&f.tree, f.root), Some(f.edit));

        assert!(focus_next(&mut f.tree, f.root));
        // The trailing text is not focusable, so the grid stays focused
        assert!(!focus_next(&mut f.tree, f.root));
        assert_eq!(focused(&f.tree, f.root), Some(f.ok));

        assert!(focus_prev(&mut f.tree, f.root));
        assert_eq!(focused(&f.tree, f.root), Some(f.edit));
    }

    #[test]
    fn test_navigation_moves_outermost_list_only() {
        let mut f = fixture();
        focus_next(&mut f.tree, f.root);
        f.tree.keypress(
            f.root,
            crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Right),
        );
        assert_eq!(focused(&f.tree, f.root), Some(f.cancel));
        assert!(focus_prev(&mut f.tree, f.root));
        assert_eq!(focused(&f.tree, f.root), Some(f.edit));
    }

    #[test]
    fn test_no_focusable_widget() {
        let mut tree = WidgetTree::new();
        let text = tree.add_plain(Widget::Text(Text::default()));
        let root = tree.add_plain(Widget::ListBox(ListBox {
            children: vec![text],
            ..ListBox::default()
        }));
        assert_eq!(focused(&tree, root), None);
        assert!(!focus_next(&mut tree, root));
    }
}
