//! The terminal the console draws to and reads from
//!
//! [`CrosstermScreen`] drives a real terminal. [`ScriptedScreen`] renders into
//! ratatui's `TestBackend` and replays prepared input batches, which is how
//! the loop is exercised without a terminal.

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{
    backend::{CrosstermBackend, TestBackend},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

/// One input event from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

pub trait Screen {
    /// Current size as (columns, rows)
    fn size(&self) -> io::Result<(u16, u16)>;

    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()>;

    /// Block until at least one event is available, then return everything
    /// that is pending
    fn poll(&mut self) -> io::Result<Vec<InputEvent>>;
}

pub struct CrosstermScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl CrosstermScreen {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        CrosstermScreen { terminal }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    fn convert(event: Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(InputEvent::Key(key)),
            Event::Resize(columns, rows) => Some(InputEvent::Resize(columns, rows)),
            _ => None,
        }
    }
}

impl Screen for CrosstermScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(|f| render(f))?;
        Ok(())
    }

    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut batch = Vec::new();
        while batch.is_empty() {
            batch.extend(Self::convert(event::read()?));
            while event::poll(Duration::ZERO)? {
                batch.extend(Self::convert(event::read()?));
            }
        }
        Ok(batch)
    }
}

/// Replays prepared input batches against an in-memory terminal
pub struct ScriptedScreen {
    terminal: Terminal<TestBackend>,
    batches: VecDeque<Vec<InputEvent>>,
    draws: usize,
}

impl ScriptedScreen {
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        Ok(ScriptedScreen {
            terminal: Terminal::new(TestBackend::new(width, height))?,
            batches: VecDeque::new(),
            draws: 0,
        })
    }

    /// Queue one batch, returned by a single `poll`
    pub fn push_batch(&mut self, batch: impl IntoIterator<Item = InputEvent>) {
        self.batches.push_back(batch.into_iter().collect());
    }

    pub fn push_key(&mut self, key: impl Into<KeyEvent>) {
        self.push_batch([InputEvent::Key(key.into())]);
    }

    pub fn pending(&self) -> usize {
        self.batches.len()
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    /// The last frame, one string per row
    pub fn buffer_lines(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width.max(1))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.buffer_lines().iter().any(|line| line.contains(text))
    }
}

impl Screen for ScriptedScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        let area = self.terminal.backend().buffer().area;
        Ok((area.width, area.height))
    }

    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(|f| render(f))?;
        self.draws += 1;
        Ok(())
    }

    /// Fails with `UnexpectedEof` once the script is exhausted
    fn poll(&mut self) -> io::Result<Vec<InputEvent>> {
        match self.batches.pop_front() {
            Some(batch) => {
                for event in &batch {
                    if let InputEvent::Resize(columns, rows) = *event {
                        self.terminal.backend_mut().resize(columns, rows);
                    }
                }
                Ok(batch)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input script exhausted",
            )),
        }
    }
}
