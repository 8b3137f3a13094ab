//! Description language parser
//!
//! This module turns description text into a widget tree:
//! - [`arguments`]: literal argument lists (`multiline=True`, `'-', top=1`)
//! - [`attributes`]: UI attribute markers (`#id @style ?INFO !TIP &event=name`)
//! - [`builder`]: line dispatch and the container stack
//!
//! # Line format
//!
//! ```text
//! OPC data
//! ```
//!
//! The opcode is the first three characters of the trimmed line. Blank lines
//! become empty spacer texts, lines starting with `#` are comments, and three
//! identical characters that are not a known opcode make a divider filled with
//! that character.
//!
//! # Parser Implementation
//!
//! Hand-written, one line at a time. Errors carry the 1-based line number.

pub mod arguments;
pub mod attributes;
pub mod builder;

pub use arguments::{parse_arguments, Arguments, Literal};
pub use attributes::{parse_attributes, parse_ui_attributes, UiAttributes};
pub use builder::TreeBuilder;
