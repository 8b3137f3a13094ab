//! Closure-backed [`Handler`]
//!
//! [`Responders`] maps `(event kind, responder name)` to a closure and owns a
//! piece of application state handed to every closure:
//!
//! ```no_run
//! use termwide::event::{Responders, Response};
//!
//! let handler = Responders::new(0usize)
//!     .on_press("save", |saves, cx, _button| {
//!         *saves += 1;
//!         cx.info("Saving");
//!         Ok(Response::Handled)
//!     })
//!     .on_edit("changeContent", |_, cx, _edit, before, after| {
//!         if before != after {
//!             cx.info("Email content changed !");
//!         }
//!         Ok(Response::Handled)
//!     });
//! ```

use super::{Event, EventKind, Handler, Response};
use crate::errors::UiResult;
use crate::ui::console::Context;
use crate::widget::WidgetId;
use crossterm::event::KeyEvent;
use rustc_hash::FxHashMap;

type Responder<S> =
    Box<dyn FnMut(&mut S, &mut Context<'_>, WidgetId, &Event<'_>) -> UiResult<Response>>;
type KeyFallback<S> = Box<dyn FnMut(&mut S, &mut Context<'_>, KeyEvent) -> UiResult<Response>>;

pub struct Responders<S> {
    state: S,
    table: FxHashMap<(EventKind, String), Responder<S>>,
    fallback: Option<KeyFallback<S>>,
}

impl<S: 'static> Responders<S> {
    pub fn new(state: S) -> Self {
        Responders {
            state,
            table: FxHashMap::default(),
            fallback: None,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    fn insert(mut self, kind: EventKind, name: &str, responder: Responder<S>) -> Self {
        self.table.insert((kind, name.to_string()), responder);
        self
    }

    pub fn on_press<F>(self, name: &str, mut f: F) -> Self
    where
        F: FnMut(&mut S, &mut Context<'_>, WidgetId) -> UiResult<Response> + 'static,
    {
        let responder: Responder<S> = Box::new(
            move |state: &mut S, cx: &mut Context<'_>, widget: WidgetId, _: &Event<'_>| {
                f(state, cx, widget)
            },
        );
        self.insert(EventKind::Press, name, responder)
    }

    /// `f` receives the text before and after the change
    pub fn on_edit<F>(self, name: &str, mut f: F) -> Self
    where
        F: FnMut(&mut S, &mut Context<'_>, WidgetId, &str, &str) -> UiResult<Response> + 'static,
    {
        let responder: Responder<S> = Box::new(
            move |state: &mut S, cx: &mut Context<'_>, widget: WidgetId, event: &Event<'_>| {
                match event {
                    Event::Edit { before, after } => f(state, cx, widget, before, after),
                    _ => Ok(Response::NotHandled),
                }
            },
        );
        self.insert(EventKind::Edit, name, responder)
    }

    pub fn on_focus<F>(self, name: &str, mut f: F) -> Self
    where
        F: FnMut(&mut S, &mut Context<'_>, WidgetId) -> UiResult<Response> + 'static,
    {
        let responder: Responder<S> = Box::new(
            move |state: &mut S, cx: &mut Context<'_>, widget: WidgetId, _: &Event<'_>| {
                f(state, cx, widget)
            },
        );
        self.insert(EventKind::Focus, name, responder)
    }

    pub fn on_key<F>(self, name: &str, mut f: F) -> Self
    where
        F: FnMut(&mut S, &mut Context<'_>, WidgetId, KeyEvent) -> UiResult<Response> + 'static,
    {
        let responder: Responder<S> = Box::new(
            move |state: &mut S, cx: &mut Context<'_>, widget: WidgetId, event: &Event<'_>| {
                match event {
                    Event::Key(key) => f(state, cx, widget, *key),
                    _ => Ok(Response::NotHandled),
                }
            },
        );
        self.insert(EventKind::Key, name, responder)
    }

    /// Responder for keys nothing else handled
    pub fn on_any_key<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut S, &mut Context<'_>, KeyEvent) -> UiResult<Response> + 'static,
    {
        self.fallback = Some(Box::new(f));
        self
    }
}

impl<S: 'static> Handler for Responders<S> {
    fn implements(&self, kind: EventKind, responder: &str) -> bool {
        self.table.contains_key(&(kind, responder.to_string()))
    }

    fn respond(
        &mut self,
        cx: &mut Context<'_>,
        responder: &str,
        widget: WidgetId,
        event: &Event<'_>,
    ) -> UiResult<Response> {
        match self.table.get_mut(&(event.kind(), responder.to_string())) {
            Some(f) => f(&mut self.state, cx, widget, event),
            None => Ok(Response::NotHandled),
        }
    }

    fn fallback_key(&mut self, cx: &mut Context<'_>, key: KeyEvent) -> UiResult<Response> {
        match self.fallback.as_mut() {
            Some(f) => f(&mut self.state, cx, key),
            None => Ok(Response::NotHandled),
        }
    }
}
