//! Palette parsing and style resolution
//!
//! - [`codes`]: the fixed mnemonic table (`DB`, `Lg`, `BO`, ...)
//! - [`palette`]: `name : fg, bg, font` rules and the [`Palette`] registry
//!
//! Style names ending in [`FOCUS_SUFFIX`] denote the focused variant of the
//! unsuffixed style (`Button*` is a focused `Button`).

pub mod codes;
pub mod palette;

pub use palette::{Palette, ResolvedStyle, StyleRule};

/// Suffix marking the focused variant of a style
pub const FOCUS_SUFFIX: &str = "*";
