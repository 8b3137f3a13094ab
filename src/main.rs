// termwide: run a terminal UI described in a text file

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use termwide::config::AppConfig;
use termwide::event::{Event, EventKind, Handler, Response};
use termwide::ui::{Console, Context, CrosstermScreen, Ui};
use termwide::widget::WidgetId;
use termwide::UiResult;

#[derive(Parser)]
#[command(name = "termwide")]
#[command(about = "Run a terminal UI from a description file", long_about = None)]
struct Args {
    /// TOML file naming the description, palette, strings and dialogs
    config: PathBuf,

    /// Parse everything and print the widget tree instead of running
    #[arg(long)]
    check: bool,

    /// Log level filter; RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

/// Responds to every binding: presses named after a configured dialog open
/// it, `quit`/`exit` stop, anything else reports the press in the footer
struct DemoHandler {
    config: AppConfig,
}

impl DemoHandler {
    fn label(cx: &Context<'_>, widget: WidgetId) -> String {
        cx.ui()
            .tree()
            .widget(widget)
            .label()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl Handler for DemoHandler {
    fn implements(&self, _kind: EventKind, _responder: &str) -> bool {
        true
    }

    fn respond(
        &mut self,
        cx: &mut Context<'_>,
        responder: &str,
        widget: WidgetId,
        event: &Event<'_>,
    ) -> UiResult<Response> {
        match event {
            Event::Press => {
                if let Some(dialog) = self.config.dialog(responder) {
                    match dialog {
                        Ok(builder) => {
                            let builder = builder.handler(DialogHandler).on_end(report_edits);
                            cx.open_dialog(builder)?;
                        }
                        Err(err) => cx.info(err.to_string()),
                    }
                } else if matches!(responder, "quit" | "exit") {
                    let message = format!("{} pressed", Self::label(cx, widget));
                    cx.end(Some(&message));
                } else {
                    let label = Self::label(cx, widget);
                    cx.info(format!("{} ({})", label, responder));
                }
                Ok(Response::Handled)
            }
            Event::Edit { after, .. } => {
                cx.tooltip(format!("{} characters", after.chars().count()));
                Ok(Response::Handled)
            }
            Event::Focus | Event::Key(_) => Ok(Response::NotHandled),
        }
    }

    fn fallback_key(&mut self, cx: &mut Context<'_>, key: KeyEvent) -> UiResult<Response> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                cx.end(None);
                Ok(Response::Handled)
            }
            _ => Ok(Response::NotHandled),
        }
    }
}

/// Any press or Esc closes the dialog
struct DialogHandler;

impl Handler for DialogHandler {
    fn implements(&self, kind: EventKind, _responder: &str) -> bool {
        kind == EventKind::Press
    }

    fn respond(
        &mut self,
        cx: &mut Context<'_>,
        _responder: &str,
        _widget: WidgetId,
        _event: &Event<'_>,
    ) -> UiResult<Response> {
        cx.end_dialog()?;
        Ok(Response::Handled)
    }

    fn fallback_key(&mut self, cx: &mut Context<'_>, key: KeyEvent) -> UiResult<Response> {
        if key.code == KeyCode::Esc {
            cx.end_dialog()?;
            return Ok(Response::Handled);
        }
        Ok(Response::NotHandled)
    }
}

/// Show the named edits of a closed dialog in the console footer
fn report_edits(dialog: &Ui, cx: &mut Context<'_>) -> UiResult<()> {
    let values: Vec<String> = dialog
        .widgets()
        .names()
        .into_iter()
        .filter_map(|name| {
            dialog
                .edit_text(name)
                .ok()
                .map(|text| format!("{}={}", name, text))
        })
        .collect();
    if !values.is_empty() {
        cx.info(values.join(", "));
    }
    Ok(())
}

fn init_logging(config: &AppConfig, level: Option<&str>) -> Result<(), Box<dyn Error>> {
    let Some(path) = config.log_file() else {
        return Ok(());
    };
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(&config.log.level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })?;
    Ok(())
}

/// Parse the console and every dialog, then print their outlines
fn check(config: &AppConfig, console: &Console) -> Result<(), Box<dyn Error>> {
    println!("{}", console.ui().outline());
    for name in config.dialogs.keys() {
        if let Some(builder) = config.dialog(name) {
            let dialog = builder?.build(Rc::clone(console.dialog_palette()))?;
            println!("dialog {}:", name);
            println!("{}", dialog.ui().outline());
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<Option<String>, Box<dyn Error>> {
    let config = AppConfig::load(&args.config)?;
    init_logging(&config, args.log_level.as_deref())?;

    let ui_config = config.ui_config()?;
    let mut console = Console::create(ui_config, DemoHandler {
        config: config.clone(),
    })?;

    if args.check {
        check(&config, &console)?;
        return Ok(None);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut screen = CrosstermScreen::new(Terminal::new(backend)?);

    let res = console.run(&mut screen);

    // Restore terminal
    disable_raw_mode()?;
    let terminal = screen.terminal_mut();
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(res?)
}

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(Some(message)) => println!("{}", message),
        Ok(None) => {}
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
