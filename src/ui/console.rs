//! Console: the main loop
//!
//! ```text
//! stopped ──run──▶ running ──end──▶ stopped
//! ```
//!
//! Each iteration of [`Console::step`]:
//!
//! 1. work out the focused widget (inside the dialog when one is shown) and
//!    fire its focus binding if focus moved
//! 2. fill the footer from the focused widget's `?INFO`/`!TOOLTIP` keys
//! 3. draw, then drop the transient footer text
//! 4. poll one batch of input; resize events update the cached size, keys go
//!    through the key chain
//! 5. fire the edit binding of the focused edit if its text changed
//!
//! The key chain is: the focused widget's `&key=` responder, the widget kit
//! (typing, button activation, arrow-key navigation), Tab/Shift-Tab focus
//! navigation, and finally the handler's fallback.
//!
//! Responders never touch the console directly. They get a [`Context`] and
//! leave requests (stop, open or end a dialog) that the loop applies once the
//! current event is done.

use super::dialog::{Dialog, DialogBuilder};
use super::focus;
use super::render::{draw_console, FooterText};
use super::screen::{InputEvent, Screen};
use super::theme::DEFAULT_DIALOG_PALETTE;
use super::Ui;
use crate::config::UiConfig;
use crate::errors::{RuntimeError, UiError, UiResult};
use crate::event::{Dispatcher, Event, Handler, Response};
use crate::style::Palette;
use crate::widget::{KeyOutcome, WidgetId};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use std::rc::Rc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Which UI a [`Context`] was opened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Console,
    Dialog,
}

/// Requests left by responders, applied by the loop between events
pub(crate) struct Control {
    stop_requested: bool,
    final_message: Option<String>,
    info: Option<String>,
    tooltip: Option<String>,
    pending_dialog: Option<DialogBuilder>,
    end_dialog: bool,
    dialog_active: bool,
    /// Default dialog palette layered over the console palette
    dialog_base: Rc<Palette>,
}

impl Control {
    fn new(dialog_base: Rc<Palette>) -> Self {
        Control {
            stop_requested: false,
            final_message: None,
            info: None,
            tooltip: None,
            pending_dialog: None,
            end_dialog: false,
            dialog_active: false,
            dialog_base,
        }
    }
}

/// What a responder can see and do
pub struct Context<'a> {
    ui: &'a mut Ui,
    control: &'a mut Control,
    scope: Scope,
}

impl<'a> Context<'a> {
    pub(crate) fn new(ui: &'a mut Ui, control: &'a mut Control, scope: Scope) -> Self {
        Context { ui, control, scope }
    }

    /// The UI the event came from: the dialog's while one is shown
    pub fn ui(&self) -> &Ui {
        self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        self.ui
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn in_dialog(&self) -> bool {
        self.scope == Scope::Dialog
    }

    pub fn widget(&self, name: &str) -> UiResult<WidgetId> {
        self.ui.widget(name)
    }

    pub fn string(&self, key: &str) -> UiResult<&str> {
        self.ui.string(key)
    }

    pub fn text(&self, name: &str) -> UiResult<String> {
        self.ui.text(name)
    }

    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> UiResult<()> {
        self.ui.set_text(name, text)
    }

    pub fn edit_text(&self, name: &str) -> UiResult<&str> {
        self.ui.edit_text(name)
    }

    pub fn set_edit_text(&mut self, name: &str, text: impl Into<String>) -> UiResult<()> {
        self.ui.set_edit_text(name, text)
    }

    pub fn label(&self, name: &str) -> UiResult<&str> {
        self.ui.label(name)
    }

    pub fn state(&self, name: &str) -> UiResult<bool> {
        self.ui.state(name)
    }

    /// Footer text for the next render only
    pub fn info(&mut self, text: impl Into<String>) {
        self.control.info = Some(text.into());
    }

    /// Right-hand footer text for the next render only
    pub fn tooltip(&mut self, text: impl Into<String>) {
        self.control.tooltip = Some(text.into());
    }

    /// Stop the loop once the current event is handled
    pub fn end(&mut self, message: Option<&str>) {
        self.control.stop_requested = true;
        self.control.final_message = message.map(str::to_string);
    }

    /// Show a dialog once the current event is handled
    pub fn open_dialog(&mut self, dialog: DialogBuilder) -> UiResult<()> {
        let busy = self.control.dialog_active && !self.control.end_dialog;
        if busy || self.control.pending_dialog.is_some() {
            return Err(RuntimeError::DialogAlreadyActive.into());
        }
        self.control.pending_dialog = Some(dialog);
        Ok(())
    }

    /// Close the shown dialog once the current event is handled
    pub fn end_dialog(&mut self) -> UiResult<()> {
        if !self.control.dialog_active {
            return Err(RuntimeError::NoActiveDialog.into());
        }
        self.control.end_dialog = true;
        Ok(())
    }
}

/// The UI and dispatcher events currently go to
struct Route<'a> {
    ui: &'a mut Ui,
    dispatcher: &'a mut Dispatcher,
    scope: Scope,
}

fn route<'a>(
    ui: &'a mut Ui,
    dispatcher: &'a mut Dispatcher,
    dialog: Option<&'a mut Dialog>,
) -> Route<'a> {
    match dialog {
        Some(dialog) => Route {
            ui: &mut dialog.ui,
            dispatcher: &mut dialog.dispatcher,
            scope: Scope::Dialog,
        },
        None => Route {
            ui,
            dispatcher,
            scope: Scope::Console,
        },
    }
}

/// Focus and edit events are tied to the UI they came from; this counter
/// changes whenever the routed UI does
type Generation = u64;

pub struct Console {
    ui: Ui,
    dispatcher: Dispatcher,
    dialog: Option<Dialog>,
    control: Control,
    state: LoopState,
    size: (u16, u16),
    last_focus: Option<(Generation, WidgetId)>,
    generation: Generation,
}

impl Console {
    /// Parse `config` and install `handler` as the first handler
    pub fn create(config: UiConfig, handler: impl Handler + 'static) -> UiResult<Self> {
        let palette = Rc::new(Palette::parse(&config.palette)?);
        let ui = Ui::parse(&config.description, palette, config.strings)?;
        let mut console = Console::new(ui, &config.dialog_palette)?;
        console.push_handler(handler);
        Ok(console)
    }

    /// A console over an already parsed UI, with no handler yet
    pub fn new(ui: Ui, dialog_palette: &str) -> UiResult<Self> {
        let dialog_base = Rc::new(Palette::parse(dialog_palette)?.with_parent(Rc::clone(ui.palette())));
        Ok(Console {
            ui,
            dispatcher: Dispatcher::new(),
            dialog: None,
            control: Control::new(dialog_base),
            state: LoopState::Stopped,
            size: (0, 0),
            last_focus: None,
            generation: 0,
        })
    }

    /// A console over `ui` with the built-in dialog palette
    pub fn with_ui(ui: Ui) -> UiResult<Self> {
        Console::new(ui, DEFAULT_DIALOG_PALETTE)
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// Palette dialogs are built over: the dialog defaults layered on the console palette
    pub fn dialog_palette(&self) -> &Rc<Palette> {
        &self.control.dialog_base
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialog.as_mut()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Last known terminal size as (columns, rows)
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Footer text waiting for the next render
    pub fn info(&self) -> Option<&str> {
        self.control.info.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.control.tooltip.as_deref()
    }

    pub fn push_handler(&mut self, handler: impl Handler + 'static) {
        self.dispatcher.push(Box::new(handler));
    }

    pub fn pop_handler(&mut self) -> Option<Box<dyn Handler>> {
        self.dispatcher.pop()
    }

    pub fn handlers(&self) -> usize {
        self.dispatcher.depth()
    }

    /// Focused widget of the routed UI
    pub fn focused(&self) -> Option<WidgetId> {
        let ui = self.dialog.as_ref().map_or(&self.ui, |d| &d.ui);
        focus::focused(&ui.tree, ui.root)
    }

    pub fn focus_next(&mut self) -> bool {
        let ui = self.dialog.as_mut().map_or(&mut self.ui, |d| &mut d.ui);
        focus::focus_next(&mut ui.tree, ui.root)
    }

    pub fn focus_prev(&mut self) -> bool {
        let ui = self.dialog.as_mut().map_or(&mut self.ui, |d| &mut d.ui);
        focus::focus_prev(&mut ui.tree, ui.root)
    }

    /// Stop the loop, keeping `message` for the caller of [`Console::run`]
    pub fn end(&mut self, message: Option<&str>) {
        self.control.stop_requested = true;
        self.control.final_message = message.map(str::to_string);
        self.state = LoopState::Stopped;
        debug!("console stopped");
    }

    /// Show `dialog` right away
    pub fn open_dialog(&mut self, dialog: DialogBuilder) -> UiResult<()> {
        if self.dialog.is_some() {
            return Err(RuntimeError::DialogAlreadyActive.into());
        }
        self.control.pending_dialog = Some(dialog);
        self.apply_requests()
    }

    /// Close the shown dialog right away, running its end callback
    pub fn end_dialog(&mut self) -> UiResult<()> {
        if self.dialog.is_none() {
            return Err(RuntimeError::NoActiveDialog.into());
        }
        self.control.end_dialog = true;
        self.apply_requests()
    }

    /// Press the clickable widget `name` of the routed UI, as Enter would
    pub fn press(&mut self, name: &str) -> UiResult<Response> {
        let route = route(&mut self.ui, &mut self.dispatcher, self.dialog.as_mut());
        let widget = route.ui.widget(name)?;
        if !route.ui.tree.activate(widget) {
            return Ok(Response::NotHandled);
        }
        let mut cx = Context::new(route.ui, &mut self.control, route.scope);
        let response = route.dispatcher.dispatch(&mut cx, widget, &Event::Press)?;
        self.apply_requests()?;
        Ok(response)
    }

    /// Run until a responder or [`Console::end`] stops the loop. Returns the
    /// final message.
    pub fn run<S: Screen>(&mut self, screen: &mut S) -> UiResult<Option<String>> {
        self.size = screen.size()?;
        self.control.stop_requested = false;
        self.control.final_message = None;
        self.state = LoopState::Running;
        debug!(columns = self.size.0, rows = self.size.1, "console running");

        while self.state == LoopState::Running {
            if let Err(err) = self.step(screen) {
                self.state = LoopState::Stopped;
                return Err(err);
            }
        }
        Ok(self.control.final_message.take())
    }

    /// One loop iteration
    pub fn step<S: Screen>(&mut self, screen: &mut S) -> UiResult<()> {
        self.fire_focus()?;
        self.apply_requests()?;
        if self.stop_if_requested() {
            return Ok(());
        }

        self.refresh_footer();
        let footer = FooterText {
            info: self.control.info.as_deref(),
            tooltip: self.control.tooltip.as_deref(),
        };
        let ui = &self.ui;
        let dialog = self.dialog.as_ref();
        screen.draw(&mut |frame: &mut Frame<'_>| draw_console(frame, ui, dialog, footer))?;
        self.control.info = None;
        self.control.tooltip = None;

        let batch = screen.poll()?;
        let before = self.edit_snapshot();

        for event in batch {
            match event {
                InputEvent::Resize(columns, rows) => {
                    trace!(columns, rows, "resize");
                    self.size = (columns, rows);
                }
                InputEvent::Key(key) => {
                    self.handle_key(key)?;
                    self.apply_requests()?;
                }
            }
            if self.control.stop_requested {
                break;
            }
        }

        if let Some((generation, widget, before)) = before {
            self.fire_edit(generation, widget, &before)?;
            self.apply_requests()?;
        }
        self.stop_if_requested();
        Ok(())
    }

    fn stop_if_requested(&mut self) -> bool {
        if self.control.stop_requested && self.state == LoopState::Running {
            self.state = LoopState::Stopped;
            debug!(message = ?self.control.final_message, "console stopped");
        }
        self.control.stop_requested
    }

    fn fire_focus(&mut self) -> UiResult<()> {
        let current = self.focused().map(|w| (self.generation, w));
        if current == self.last_focus {
            return Ok(());
        }
        self.last_focus = current;
        let Some((_, widget)) = current else {
            return Ok(());
        };

        let route = route(&mut self.ui, &mut self.dispatcher, self.dialog.as_mut());
        let mut cx = Context::new(route.ui, &mut self.control, route.scope);
        match route.dispatcher.dispatch(&mut cx, widget, &Event::Focus) {
            Ok(_) => Ok(()),
            Err(UiError::Runtime(
                err @ (RuntimeError::MissingResponder { .. } | RuntimeError::NoHandler { .. }),
            )) => {
                warn!(%err, "focus event not handled");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn refresh_footer(&mut self) {
        let Some(widget) = self.focused() else {
            return;
        };
        let ui = self.dialog.as_ref().map_or(&self.ui, |d| &d.ui);
        let meta = &ui.tree.node(widget).meta;
        if self.control.info.is_none() {
            if let Some(text) = meta.info.as_deref().and_then(|k| ui.strings.get(k).ok()) {
                self.control.info = Some(text.to_string());
            }
        }
        if self.control.tooltip.is_none() {
            if let Some(text) = meta.tooltip.as_deref().and_then(|k| ui.strings.get(k).ok()) {
                self.control.tooltip = Some(text.to_string());
            }
        }
    }

    /// Text of the focused edit, tagged with where it came from
    fn edit_snapshot(&self) -> Option<(Generation, WidgetId, String)> {
        let widget = self.focused()?;
        let ui = self.dialog.as_ref().map_or(&self.ui, |d| &d.ui);
        let text = ui.tree.widget(widget).edit_text()?;
        Some((self.generation, widget, text.to_string()))
    }

    fn fire_edit(&mut self, generation: Generation, widget: WidgetId, before: &str) -> UiResult<()> {
        if generation != self.generation {
            return Ok(());
        }
        let route = route(&mut self.ui, &mut self.dispatcher, self.dialog.as_mut());
        let Some(after) = route.ui.tree.widget(widget).edit_text().map(str::to_string) else {
            return Ok(());
        };
        if after == before {
            return Ok(());
        }
        trace!(widget = widget.index(), "edit changed");
        let mut cx = Context::new(route.ui, &mut self.control, route.scope);
        route.dispatcher.dispatch(
            &mut cx,
            widget,
            &Event::Edit {
                before,
                after: &after,
            },
        )?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> UiResult<()> {
        trace!(?key, "key");
        let route = route(&mut self.ui, &mut self.dispatcher, self.dialog.as_mut());
        let root = route.ui.root;
        let mut cx = Context::new(route.ui, &mut self.control, route.scope);

        if let Some(widget) = focus::focused(&cx.ui.tree, root) {
            if route.dispatcher.dispatch(&mut cx, widget, &Event::Key(key))? == Response::Handled {
                return Ok(());
            }
        }

        match cx.ui.tree.keypress(root, key) {
            KeyOutcome::Consumed => return Ok(()),
            KeyOutcome::Pressed(widget) => {
                route.dispatcher.dispatch(&mut cx, widget, &Event::Press)?;
                return Ok(());
            }
            KeyOutcome::Unhandled => {}
        }

        let moved = match key.code {
            KeyCode::Tab => focus::focus_next(&mut cx.ui.tree, root),
            KeyCode::BackTab => focus::focus_prev(&mut cx.ui.tree, root),
            _ => false,
        };
        if moved {
            return Ok(());
        }

        route.dispatcher.fallback_key(&mut cx, key)?;
        Ok(())
    }

    /// Apply dialog requests left by responders: end first, then open
    fn apply_requests(&mut self) -> UiResult<()> {
        if self.control.end_dialog {
            self.control.end_dialog = false;
            if let Some(mut dialog) = self.dialog.take() {
                self.control.dialog_active = false;
                self.generation += 1;
                debug!("dialog closed");
                if let Some(on_end) = dialog.on_end.take() {
                    let mut cx = Context::new(&mut self.ui, &mut self.control, Scope::Console);
                    on_end(&dialog.ui, &mut cx)?;
                }
            }
        }

        if let Some(builder) = self.control.pending_dialog.take() {
            let dialog = builder.build(Rc::clone(&self.control.dialog_base))?;
            self.dialog = Some(dialog);
            self.control.dialog_active = true;
            self.generation += 1;
            debug!("dialog opened");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Responders;
    use crate::registry::StringTable;
    use crate::ui::screen::ScriptedScreen;
    use crossterm::event::KeyCode;

    fn console(description: &str, handler: impl Handler + 'static) -> Console {
        let config = UiConfig::new("", description);
        Console::create(config, handler).unwrap()
    }

    #[test]
    fn test_end_returns_message() {
        let handler = Responders::new(()).on_press("quit", |_, cx, _| {
            cx.end(Some("bye"));
            Ok(Response::Handled)
        });
        let mut console = console("Btn [Quit] #quit &press=quit", handler);
        let mut screen = ScriptedScreen::new(30, 5).unwrap();
        screen.push_key(KeyCode::Enter);

        assert_eq!(console.run(&mut screen).unwrap().as_deref(), Some("bye"));
        assert_eq!(console.state(), LoopState::Stopped);
        assert_eq!(screen.draws(), 1);
    }

    #[test]
    fn test_exhausted_script_is_an_error() {
        let mut console = console("Txt idle", Responders::new(()));
        let mut screen = ScriptedScreen::new(30, 5).unwrap();
        assert!(matches!(console.run(&mut screen), Err(UiError::Io(_))));
        assert!(!console.is_running());
    }

    #[test]
    fn test_resize_updates_size() {
        let mut console = console("Txt idle", Responders::new(()));
        let mut screen = ScriptedScreen::new(30, 5).unwrap();
        screen.push_batch([InputEvent::Resize(50, 12)]);
        console.size = (30, 5);
        console.step(&mut screen).unwrap();
        assert_eq!(console.size(), (50, 12));
    }

    #[test]
    fn test_footer_shows_info_key() {
        let mut config = UiConfig::new("", "Edt From [me] #from ?FROM");
        config.strings = StringTable::from_pairs([("FROM", "Your address")]).unwrap();
        let mut console = Console::create(config, Responders::new(())).unwrap();
        let mut screen = ScriptedScreen::new(30, 4).unwrap();
        screen.push_key(KeyCode::Char('x'));
        console.step(&mut screen).unwrap();
        assert!(screen.contains("Your address"));
        // Transient text is gone once drawn
        assert_eq!(console.info(), None);
    }

    #[test]
    fn test_dialog_requests_are_checked() {
        let mut console = console("Txt idle", Responders::new(()));
        assert!(matches!(
            console.end_dialog(),
            Err(UiError::Runtime(RuntimeError::NoActiveDialog))
        ));
        console.open_dialog(DialogBuilder::new("Txt hi")).unwrap();
        assert!(console.dialog().is_some());
        assert!(matches!(
            console.open_dialog(DialogBuilder::new("Txt again")),
            Err(UiError::Runtime(RuntimeError::DialogAlreadyActive))
        ));
        console.end_dialog().unwrap();
        assert!(console.dialog().is_none());
    }

    #[test]
    fn test_unbound_focus_is_not_fatal() {
        let mut console = console("Btn [A] &focus=entered", Responders::new(()));
        let mut screen = ScriptedScreen::new(30, 4).unwrap();
        screen.push_batch(Vec::new());
        console.step(&mut screen).unwrap();
    }
}
