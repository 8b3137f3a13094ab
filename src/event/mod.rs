//! Event binding and dispatch
//!
//! A description binds events to responder names (`&press=save`). At runtime
//! the [`Dispatcher`] looks up the binding on the widget that produced the
//! event and hands it to the active [`Handler`], the top of a handler stack.
//!
//! # Event kinds
//!
//! | kind | produced by | missing responder |
//! |---|---|---|
//! | `press` | buttons, checkboxes, radio buttons | [`RuntimeError::MissingResponder`] |
//! | `edit` | edit fields whose text changed during a loop iteration | [`RuntimeError::MissingResponder`] |
//! | `focus` | the focused widget changing | [`RuntimeError::MissingResponder`] |
//! | `key` | any key while the widget is focused | falls through to the widget kit |
//!
//! Whether a widget kind may carry a binding at all is checked when the
//! description is parsed (see [`EventKind::accepts`]).

pub mod responders;

use crate::errors::{RuntimeError, UiResult};
use crate::ui::console::Context;
use crate::widget::{Widget, WidgetId};
use crossterm::event::KeyEvent;

pub use responders::Responders;

/// The kinds of events a description can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Press,
    Edit,
    Focus,
    Key,
}

impl EventKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "press" => Some(EventKind::Press),
            "edit" => Some(EventKind::Edit),
            "focus" => Some(EventKind::Focus),
            "key" => Some(EventKind::Key),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Press => "press",
            EventKind::Edit => "edit",
            EventKind::Focus => "focus",
            EventKind::Key => "key",
        }
    }

    /// Bind-time capability check
    pub fn accepts(self, widget: &Widget) -> bool {
        match self {
            EventKind::Press => widget.is_clickable(),
            EventKind::Edit => widget.is_editable(),
            EventKind::Focus | EventKind::Key => true,
        }
    }
}

/// A runtime event delivered to a responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Press,
    Edit { before: &'a str, after: &'a str },
    Focus,
    Key(KeyEvent),
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Press => EventKind::Press,
            Event::Edit { .. } => EventKind::Edit,
            Event::Focus => EventKind::Focus,
            Event::Key(_) => EventKind::Key,
        }
    }
}

/// Whether a responder consumed its event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Handled,
    /// Let the next step of the key fallback chain see the event
    NotHandled,
}

/// A responder table for the events a description binds.
///
/// `implements` answers without running anything, so the dispatcher can tell a
/// missing responder apart from one that declined the event.
pub trait Handler {
    fn implements(&self, kind: EventKind, responder: &str) -> bool;

    fn respond(
        &mut self,
        cx: &mut Context<'_>,
        responder: &str,
        widget: WidgetId,
        event: &Event<'_>,
    ) -> UiResult<Response>;

    /// Last step of the key chain, after the widget kit and focus shortcuts
    fn fallback_key(&mut self, _cx: &mut Context<'_>, _key: KeyEvent) -> UiResult<Response> {
        Ok(Response::NotHandled)
    }
}

/// Stack of handlers; only the top one receives events
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handler: Box<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Handler>> {
        self.handlers.pop()
    }

    pub fn depth(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `event` to the responder bound on `widget`.
    ///
    /// An unbound widget yields `NotHandled`. A bound but unimplemented
    /// responder is an error, except for key events which fall back to the
    /// widget kit.
    pub fn dispatch(
        &mut self,
        cx: &mut Context<'_>,
        widget: WidgetId,
        event: &Event<'_>,
    ) -> UiResult<Response> {
        let kind = event.kind();
        let Some(responder) = cx.ui().tree().node(widget).meta.events.get(&kind).cloned() else {
            return Ok(Response::NotHandled);
        };

        let Some(handler) = self.handlers.last_mut() else {
            if kind == EventKind::Key {
                return Ok(Response::NotHandled);
            }
            return Err(RuntimeError::NoHandler {
                event: kind.name(),
                responder,
            }
            .into());
        };

        if !handler.implements(kind, &responder) {
            if kind == EventKind::Key {
                return Ok(Response::NotHandled);
            }
            return Err(RuntimeError::MissingResponder {
                event: kind.name(),
                responder,
            }
            .into());
        }

        tracing::debug!(event = kind.name(), responder = %responder, widget = widget.index(), "dispatch");
        handler.respond(cx, &responder, widget, event)
    }

    /// Offer an otherwise unhandled key to the active handler
    pub fn fallback_key(&mut self, cx: &mut Context<'_>, key: KeyEvent) -> UiResult<Response> {
        match self.handlers.last_mut() {
            Some(handler) => handler.fallback_key(cx, key),
            None => Ok(Response::NotHandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Button, Edit, Text};

    #[test]
    fn test_event_names_round_trip() {
        for kind in [EventKind::Press, EventKind::Edit, EventKind::Focus, EventKind::Key] {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("click"), None);
    }

    #[test]
    fn test_capabilities() {
        let button = Widget::Button(Button { label: "OK".into() });
        let edit = Widget::Edit(Edit::new("", ""));
        let text = Widget::Text(Text::default());

        assert!(EventKind::Press.accepts(&button));
        assert!(!EventKind::Press.accepts(&edit));
        assert!(EventKind::Edit.accepts(&edit));
        assert!(!EventKind::Edit.accepts(&button));
        assert!(EventKind::Key.accepts(&text));
        assert!(EventKind::Focus.accepts(&text));
    }
}
