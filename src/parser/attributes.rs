//! Attribute tokenizer
//!
//! Splits the data part of a description line into UI attribute markers and
//! the literal-argument remainder:
//!
//! ```text
//! #btn_save @primary ?SAVE !SAVE_TIP &press=save   cell_width=10
//! └─────────────── markers ──────────────────┘    └── arguments ──┘
//! ```
//!
//! | marker | meaning |
//! |---|---|
//! | `#name` | widget id |
//! | `@name` | style name (repeatable, earlier wins) |
//! | `?KEY` | info string-table key |
//! | `!KEY` | tooltip string-table key |
//! | `&event=responder` | event binding |
//!
//! Markers are consumed from the front until the first token that is not a
//! marker; everything after it goes to [`parse_arguments`].

use super::arguments::{parse_arguments, Arguments};
use crate::errors::SyntaxError;
use crate::event::EventKind;
use std::collections::BTreeMap;

/// UI attributes collected from the markers of one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiAttributes {
    pub id: Option<String>,
    pub styles: Vec<String>,
    pub info: Option<String>,
    pub tooltip: Option<String>,
    pub events: BTreeMap<EventKind, String>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Marker scanner over one line fragment
struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, line: usize) -> Self {
        Self {
            input,
            position: 0,
            line,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// Length in bytes of the name starting at `from`
    fn name_len(&self, from: usize) -> usize {
        self.input[from..]
            .char_indices()
            .find(|(_, c)| !is_name_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(self.input.len() - from)
    }

    fn scan(&mut self) -> Result<UiAttributes, SyntaxError> {
        let mut attrs = UiAttributes::default();

        loop {
            self.skip_whitespace();
            let Some(marker) = self.rest().chars().next() else {
                break;
            };

            match marker {
                '#' | '@' | '?' | '!' => {
                    let start = self.position + 1;
                    let len = self.name_len(start);
                    if len == 0 {
                        break;
                    }
                    let name = self.input[start..start + len].to_string();
                    self.position = start + len;
                    match marker {
                        '#' => {
                            if attrs.id.is_some() {
                                return Err(self.malformed(&format!("#{}", name)));
                            }
                            attrs.id = Some(name);
                        }
                        '@' => attrs.styles.push(name),
                        '?' => attrs.info = Some(name),
                        _ => attrs.tooltip = Some(name),
                    }
                }
                '&' => self.event(&mut attrs)?,
                _ => break,
            }
        }

        Ok(attrs)
    }

    fn event(&mut self, attrs: &mut UiAttributes) -> Result<(), SyntaxError> {
        let start = self.position;
        let event_start = start + 1;
        let event_len = self.name_len(event_start);
        let eq = event_start + event_len;

        if event_len == 0 || !self.input[eq..].starts_with('=') {
            let token: String = self.rest().split_whitespace().next().unwrap_or("").to_string();
            return Err(self.malformed(&token));
        }
        let responder_len = self.name_len(eq + 1);
        if responder_len == 0 {
            let token = self.input[start..eq + 1].to_string();
            return Err(self.malformed(&token));
        }

        let event = &self.input[event_start..eq];
        let responder = &self.input[eq + 1..eq + 1 + responder_len];
        let kind = EventKind::from_name(event).ok_or_else(|| SyntaxError::UnknownEvent {
            event: event.to_string(),
            line: self.line,
        })?;
        if attrs.events.contains_key(&kind) {
            return Err(self.malformed(&self.input[start..eq + 1 + responder_len]));
        }
        attrs.events.insert(kind, responder.to_string());
        self.position = eq + 1 + responder_len;
        Ok(())
    }

    fn malformed(&self, text: &str) -> SyntaxError {
        SyntaxError::MalformedAttribute {
            text: text.to_string(),
            line: self.line,
        }
    }
}

/// Extract the leading markers of `data`, returning them with the remainder
pub fn parse_ui_attributes(data: &str, line: usize) -> Result<(UiAttributes, &str), SyntaxError> {
    let mut tokenizer = Tokenizer::new(data, line);
    let attrs = tokenizer.scan()?;
    Ok((attrs, tokenizer.rest()))
}

/// Extract the markers and parse the remainder as literal arguments
pub fn parse_attributes(data: &str, line: usize) -> Result<(UiAttributes, Arguments), SyntaxError> {
    let (attrs, rest) = parse_ui_attributes(data, line)?;
    let args = parse_arguments(rest, line)?;
    Ok((attrs, args))
}
