//! Literal argument lists
//!
//! Whatever follows the attribute markers on a description line is a list of
//! literal arguments such as `multiline=True` or `'x', top=1`. Only literals
//! are accepted: quoted strings, integers, floats, booleans and bare
//! identifiers. Nothing is evaluated.
//!
//! ```text
//! arguments := (argument (','? argument)*)? ','?
//! argument  := IDENT '=' literal | literal
//! literal   := STRING | INT | FLOAT | BOOL | IDENT
//! ```

use crate::errors::SyntaxError;
use std::fmt;

/// A literal argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(String),
}

impl Literal {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            Literal::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Strings and bare identifiers both read as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Str(s) | Literal::Ident(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Ident(s) => write!(f, "{}", s),
        }
    }
}

/// Positional and keyword arguments of one description line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Literal>,
    pub keyword: Vec<(String, Literal)>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Remove and return a keyword argument
    pub fn take(&mut self, name: &str) -> Option<Literal> {
        let index = self.keyword.iter().position(|(k, _)| k == name)?;
        Some(self.keyword.remove(index).1)
    }

    /// Remove and return the first positional argument
    pub fn take_positional(&mut self) -> Option<Literal> {
        if self.positional.is_empty() {
            None
        } else {
            Some(self.positional.remove(0))
        }
    }

    pub fn take_bool(
        &mut self,
        name: &str,
        widget: &'static str,
        line: usize,
    ) -> Result<Option<bool>, SyntaxError> {
        self.take_typed(name, widget, "a boolean", line, Literal::as_bool)
    }

    pub fn take_usize(
        &mut self,
        name: &str,
        widget: &'static str,
        line: usize,
    ) -> Result<Option<usize>, SyntaxError> {
        self.take_typed(name, widget, "a non-negative integer", line, |lit| {
            lit.as_int().and_then(|n| usize::try_from(n).ok())
        })
    }

    pub fn take_text(
        &mut self,
        name: &str,
        widget: &'static str,
        line: usize,
    ) -> Result<Option<String>, SyntaxError> {
        self.take_typed(name, widget, "a string", line, |lit| {
            lit.as_text().map(str::to_string)
        })
    }

    fn take_typed<T>(
        &mut self,
        name: &str,
        widget: &'static str,
        expected: &'static str,
        line: usize,
        convert: impl FnOnce(&Literal) -> Option<T>,
    ) -> Result<Option<T>, SyntaxError> {
        match self.take(name) {
            None => Ok(None),
            Some(lit) => convert(&lit)
                .map(Some)
                .ok_or_else(|| SyntaxError::InvalidArgument {
                    name: name.to_string(),
                    widget,
                    expected,
                    line,
                }),
        }
    }

    /// Fail if any argument was left unconsumed by the widget constructor
    pub fn finish(self, widget: &'static str, line: usize) -> Result<(), SyntaxError> {
        if let Some((name, _)) = self.keyword.first() {
            return Err(SyntaxError::UnsupportedArgument {
                name: name.clone(),
                widget,
                line,
            });
        }
        if let Some(extra) = self.positional.first() {
            return Err(SyntaxError::UnsupportedArgument {
                name: extra.to_string(),
                widget,
                line,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ArgToken {
    Literal(Literal),
    Ident(String),
    Eq,
    Comma,
    Eof,
}

struct ArgLexer {
    input: Vec<char>,
    position: usize,
}

impl ArgLexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn tokenize(&mut self) -> Result<Vec<ArgToken>, String> {
        let mut tokens = Vec::new();
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.position += 1;
            }
            let Some(ch) = self.advance() else {
                tokens.push(ArgToken::Eof);
                return Ok(tokens);
            };
            let token = match ch {
                '=' => ArgToken::Eq,
                ',' => ArgToken::Comma,
                '\'' | '"' => ArgToken::Literal(Literal::Str(self.string(ch)?)),
                '-' | '+' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    ArgToken::Literal(self.number(ch)?)
                }
                '0'..='9' => ArgToken::Literal(self.number(ch)?),
                c if c.is_alphanumeric() || c == '_' => {
                    let mut word = String::from(c);
                    while let Some(c) = self.peek() {
                        if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                            word.push(c);
                            self.position += 1;
                        } else {
                            break;
                        }
                    }
                    ArgToken::Ident(word)
                }
                other => return Err(format!("unexpected character '{}'", other)),
            };
            tokens.push(token);
        }
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err("unterminated string".to_string()),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                    Some(c) => return Err(format!("unknown escape '\\{}'", c)),
                    None => return Err("unterminated string".to_string()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self, first: char) -> Result<Literal, String> {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                text.push(c);
                self.position += 1;
            } else {
                break;
            }
        }
        let cleaned = text.replace('_', "");
        if cleaned.contains('.') {
            cleaned
                .parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| format!("invalid number '{}'", text))
        } else {
            cleaned
                .parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| format!("invalid number '{}'", text))
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }
}

struct ArgParser {
    tokens: Vec<ArgToken>,
    position: usize,
}

impl ArgParser {
    fn parse(&mut self) -> Result<Arguments, String> {
        let mut args = Arguments::default();
        while !self.check(&ArgToken::Eof) {
            self.argument(&mut args)?;
            if self.check(&ArgToken::Comma) {
                self.position += 1;
            }
        }
        Ok(args)
    }

    fn argument(&mut self, args: &mut Arguments) -> Result<(), String> {
        match self.advance() {
            ArgToken::Ident(name) if self.check(&ArgToken::Eq) => {
                self.position += 1;
                let value = self.literal()?;
                if args.keyword.iter().any(|(k, _)| *k == name) {
                    return Err(format!("keyword argument '{}' repeated", name));
                }
                args.keyword.push((name, value));
            }
            token => {
                if !args.keyword.is_empty() {
                    return Err("positional argument follows keyword argument".to_string());
                }
                args.positional.push(Self::to_literal(token)?);
            }
        }
        Ok(())
    }

    fn literal(&mut self) -> Result<Literal, String> {
        let token = self.advance();
        Self::to_literal(token)
    }

    fn to_literal(token: ArgToken) -> Result<Literal, String> {
        match token {
            ArgToken::Literal(lit) => Ok(lit),
            ArgToken::Ident(word) => Ok(match word.as_str() {
                "True" | "true" => Literal::Bool(true),
                "False" | "false" => Literal::Bool(false),
                _ => Literal::Ident(word),
            }),
            ArgToken::Eq => Err("unexpected '='".to_string()),
            ArgToken::Comma => Err("unexpected ','".to_string()),
            ArgToken::Eof => Err("expected a value".to_string()),
        }
    }

    fn check(&self, token: &ArgToken) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn peek(&self) -> &ArgToken {
        self.tokens.get(self.position).unwrap_or(&ArgToken::Eof)
    }

    fn advance(&mut self) -> ArgToken {
        let token = self.peek().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }
}

/// Parse the literal-argument remainder of a description line
pub fn parse_arguments(text: &str, line: usize) -> Result<Arguments, SyntaxError> {
    let malformed = |reason: String| SyntaxError::MalformedArguments {
        text: text.to_string(),
        reason,
        line,
    };
    let tokens = ArgLexer::new(text).tokenize().map_err(malformed)?;
    ArgParser {
        tokens,
        position: 0,
    }
    .parse()
    .map_err(malformed)
}
