// Integration tests for description parsing and the console loop

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyCode;
use termwide::errors::{RuntimeError, SyntaxError, StyleError};
use termwide::event::{Response, Responders};
use termwide::registry::StringTable;
use termwide::ui::{InputEvent, ScriptedScreen};
use termwide::widget::{Align, Widget, WidgetId};
use termwide::{Console, DialogBuilder, UiConfig, UiError};

type Log = Rc<RefCell<Vec<String>>>;

fn console(palette: &str, description: &str, handler: Responders<Log>) -> Console {
    Console::create(UiConfig::new(palette, description), handler).expect("Console creation failed")
}

fn parse_error(description: &str) -> UiError {
    match Console::create(UiConfig::new("", description), Responders::new(())) {
        Ok(_) => panic!("Expected {:?} to be rejected", description),
        Err(err) => err,
    }
}

fn body_children(console: &Console) -> Vec<WidgetId> {
    let ui = console.ui();
    ui.tree()
        .widget(ui.body())
        .as_container()
        .expect("Body is a container")
        .children()
        .to_vec()
}

// === PARSING ===

#[test]
fn test_press_reaches_responder_once() {
    let log: Log = Rc::default();
    let pressed: Rc<RefCell<Vec<WidgetId>>> = Rc::default();
    let seen = Rc::clone(&pressed);
    let handler = Responders::new(Rc::clone(&log)).on_press("save", move |log, _, widget| {
        log.borrow_mut().push("save".to_string());
        seen.borrow_mut().push(widget);
        Ok(Response::Handled)
    });
    let mut console = console("", "Btn [OK] #ok &press=save", handler);

    let response = console.press("ok").expect("Press failed");
    assert_eq!(response, Response::Handled);
    assert_eq!(*log.borrow(), vec!["save"]);
    let ok = console.ui().widget("ok").expect("ok is registered");
    assert_eq!(*pressed.borrow(), vec![ok]);
}

#[test]
fn test_dash_line_is_one_divider() {
    let console = console("", "Txt above\n---\nTxt below", Responders::new(Rc::default()));
    let children = body_children(&console);
    assert_eq!(children.len(), 3);

    let dividers: Vec<_> = children
        .iter()
        .filter_map(|&id| match console.ui().tree().widget(id) {
            Widget::Divider(divider) => Some(divider.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(dividers.len(), 1);
    assert_eq!(dividers[0].fill, '-');
    assert_eq!(dividers[0].caption, "");
}

#[test]
fn test_grid_flow_cell_width() {
    let console = console(
        "",
        "GFl\nBtn [OK]\nBtn [Cancel]\nEnd",
        Responders::new(Rc::default()),
    );
    let children = body_children(&console);
    match console.ui().tree().widget(children[0]) {
        Widget::GridFlow(grid) => {
            assert_eq!(grid.cell_width, 10);
            assert_eq!(grid.h_sep, 1);
            assert_eq!(grid.v_sep, 1);
            assert_eq!(grid.align, Align::Center);
        }
        other => panic!("Expected grid flow, got {:?}", other),
    }
}

#[test]
fn test_style_resolution_order() {
    let palette = "#ok : WH, DB, _\n\
                   shine : YL, _, BO\n\
                   shine* : BL, YL, _\n\
                   Button : Lg, _, _";
    let console = console(
        palette,
        "Btn [OK] #ok @shine\nBtn [Go] @shine\nBtn [Plain]\nTxt unstyled",
        Responders::new(Rc::default()),
    );
    let names: Vec<Option<(Option<String>, Option<String>)>> = body_children(&console)
        .iter()
        .map(|&id| match console.ui().tree().widget(id) {
            Widget::AttrMap(map) => Some((map.names.normal.clone(), map.names.focus.clone())),
            _ => None,
        })
        .collect();

    let pair = |n: &str, f: &str| Some((Some(n.to_string()), Some(f.to_string())));
    // Id style beats the named style, whose focus variant still applies
    assert_eq!(names[0], pair("#ok", "shine*"));
    assert_eq!(names[1], pair("shine", "shine*"));
    // Class name last, focus falls back to the unfocused style
    assert_eq!(names[2], pair("Button", "Button"));
    assert_eq!(names[3], None);
}

#[test]
fn test_string_substitution() {
    let strings = StringTable::from_pairs([("NAME", "World")]).expect("Valid strings");
    let config = UiConfig::new("", "Txt Hello ${NAME} args:#greeting").with_strings(strings);
    let console = Console::create(config, Responders::new(())).expect("Console creation failed");
    assert_eq!(console.ui().text("greeting").expect("Has text"), "Hello World");
}

// === PARSE ERRORS ===

#[test]
fn test_unbalanced_end() {
    assert!(matches!(
        parse_error("Txt a\nEnd"),
        UiError::Syntax(SyntaxError::UnbalancedEnd { line: 2 })
    ));
}

#[test]
fn test_unclosed_container() {
    assert!(matches!(
        parse_error("Ple\nCol\nTxt a\nEnd"),
        UiError::Syntax(SyntaxError::UnclosedContainer { depth: 1 })
    ));
}

#[test]
fn test_unrecognized_widget() {
    match parse_error("Txt a\nXyz b") {
        UiError::Syntax(SyntaxError::UnrecognizedWidget { opcode, line }) => {
            assert_eq!(opcode, "Xyz");
            assert_eq!(line, 2);
        }
        other => panic!("Expected UnrecognizedWidget, got {:?}", other),
    }
}

#[test]
fn test_duplicate_id() {
    assert!(matches!(
        parse_error("Btn [A] #same\nGFl\nBtn [B] #same\nEnd"),
        UiError::Runtime(RuntimeError::DuplicateId { .. })
    ));
}

#[test]
fn test_capability_mismatch_at_parse_time() {
    assert!(matches!(
        parse_error("Txt hello args:&press=save"),
        UiError::Runtime(RuntimeError::BindingMismatch { event: "press", .. })
    ));
    assert!(matches!(
        parse_error("Btn [OK] &edit=changed"),
        UiError::Runtime(RuntimeError::BindingMismatch { event: "edit", .. })
    ));
}

#[test]
fn test_malformed_button() {
    assert!(matches!(
        parse_error("Btn OK"),
        UiError::Syntax(SyntaxError::MalformedButton { .. })
    ));
}

#[test]
fn test_unknown_palette_code() {
    let result = Console::create(UiConfig::new("Button : XX, _, _", "Btn [OK]"), Responders::new(()));
    assert!(matches!(
        result,
        Err(UiError::Style(StyleError::UnknownCode { .. }))
    ));
}

// === DISPATCH ===

#[test]
fn test_missing_responder() {
    let mut console = console("", "Btn [OK] #ok &press=save", Responders::new(Rc::default()));
    assert!(matches!(
        console.press("ok"),
        Err(UiError::Runtime(RuntimeError::MissingResponder { .. }))
    ));
}

#[test]
fn test_focus_navigation_clamps() {
    let mut console = console(
        "",
        "Txt a\nBtn [A] #a\nTxt b\nBtn [B] #b\nTxt c",
        Responders::new(Rc::default()),
    );
    let a = console.ui().widget("a").expect("a is registered");
    let b = console.ui().widget("b").expect("b is registered");

    assert_eq!(console.focused(), Some(a));
    assert!(!console.focus_prev());
    assert_eq!(console.focused(), Some(a));
    assert!(console.focus_next());
    assert_eq!(console.focused(), Some(b));
    assert!(!console.focus_next());
    assert_eq!(console.focused(), Some(b));
}

// === MAIN LOOP ===

#[test]
fn test_edit_change_fires_once() {
    let log: Log = Rc::default();
    let handler = Responders::new(Rc::clone(&log)).on_edit("changed", |log, _, _, before, after| {
        log.borrow_mut().push(format!("{}->{}", before, after));
        Ok(Response::Handled)
    });
    let mut console = console("", "Edt Name [ab] #name &edit=changed", handler);
    let mut screen = ScriptedScreen::new(40, 6).expect("Screen creation failed");

    screen.push_key(KeyCode::Char('c'));
    console.step(&mut screen).expect("Step failed");
    assert_eq!(*log.borrow(), vec!["ab->abc"]);

    // No keys, no change, no event
    screen.push_batch(Vec::new());
    console.step(&mut screen).expect("Step failed");
    assert_eq!(log.borrow().len(), 1);

    // Typing then deleting inside one batch leaves the text unchanged
    screen.push_batch([
        InputEvent::Key(KeyCode::Char('d').into()),
        InputEvent::Key(KeyCode::Backspace.into()),
    ]);
    console.step(&mut screen).expect("Step failed");
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(console.ui().edit_text("name").expect("Editable"), "abc");
}

#[test]
fn test_dialog_routing_restored_after_end() {
    let log: Log = Rc::default();
    let handler = Responders::new(Rc::clone(&log)).on_press("ask", |log, cx, _| {
        log.borrow_mut().push("ask".to_string());
        let dialog_log = Rc::clone(log);
        let dialog = DialogBuilder::new("Txt Sure?\nBtn [OK] #confirm &press=confirm")
            .header("Question")
            .handler(Responders::new(dialog_log).on_press("confirm", |log, cx, _| {
                log.borrow_mut().push("confirm".to_string());
                cx.end_dialog()?;
                Ok(Response::Handled)
            }))
            .on_end(|_, cx| {
                cx.set_text("status", "confirmed")?;
                Ok(())
            });
        cx.open_dialog(dialog)?;
        Ok(Response::Handled)
    });
    let mut console = console(
        "",
        "Btn [Ask] #ask &press=ask\nTxt idle args:#status",
        handler,
    );
    let mut screen = ScriptedScreen::new(60, 20).expect("Screen creation failed");

    screen.push_key(KeyCode::Enter);
    console.step(&mut screen).expect("Step failed");
    assert!(console.dialog().is_some());

    // Enter now goes to the dialog's button
    screen.push_key(KeyCode::Enter);
    console.step(&mut screen).expect("Step failed");
    assert!(console.dialog().is_none());
    assert_eq!(console.ui().text("status").expect("Has text"), "confirmed");

    // And back to the console's
    screen.push_key(KeyCode::Enter);
    console.step(&mut screen).expect("Step failed");
    assert_eq!(*log.borrow(), vec!["ask", "confirm", "ask"]);
}

#[test]
fn test_dialog_is_drawn_over_console() {
    let handler = Responders::new(Rc::<RefCell<Vec<String>>>::default());
    let mut console = console("", "Hdr Main Title\nTxt body", handler);
    console
        .open_dialog(DialogBuilder::new("Txt Inside the dialog").width(30))
        .expect("Dialog opens");

    let mut screen = ScriptedScreen::new(60, 12).expect("Screen creation failed");
    screen.push_batch(Vec::new());
    console.step(&mut screen).expect("Step failed");
    assert!(screen.contains("Main Title"));
    assert!(screen.contains("Inside the dialog"));
}

#[test]
fn test_dialog_header_and_footer_are_drawn() {
    let mut console = console("", "Txt main body", Responders::new(Rc::default()));
    console
        .open_dialog(DialogBuilder::new("Hdr Alert dialog\nTxt Body line\nFtr Dialog foot").height(10))
        .expect("Dialog opens");

    let mut screen = ScriptedScreen::new(60, 20).expect("Screen creation failed");
    screen.push_batch(Vec::new());
    console.step(&mut screen).expect("Step failed");
    assert!(screen.contains("Alert dialog"));
    assert!(screen.contains("Body line"));
    assert!(screen.contains("Dialog foot"));
}

#[test]
fn test_run_until_end() {
    let handler = Responders::new(Rc::<RefCell<Vec<String>>>::default())
        .on_press("quit", |_, cx, _| {
            cx.end(Some("done"));
            Ok(Response::Handled)
        });
    let mut console = console("", "Txt hello\nBtn [Quit] &press=quit", handler);
    let mut screen = ScriptedScreen::new(40, 6).expect("Screen creation failed");
    screen.push_batch([InputEvent::Resize(50, 8)]);
    screen.push_key(KeyCode::Enter);

    let message = console.run(&mut screen).expect("Run failed");
    assert_eq!(message.as_deref(), Some("done"));
    assert_eq!(console.size(), (50, 8));
    assert_eq!(screen.pending(), 0);
    assert!(screen.contains("< Quit >"));
}
