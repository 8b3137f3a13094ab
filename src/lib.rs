//! # Introduction
//!
//! termwide builds terminal user interfaces from a compact, line-oriented
//! description language and runs them on [ratatui](https://docs.rs/ratatui).
//!
//! ```text
//! Hdr Mail Editor
//! ___
//! Edt From    [me@example.com]   #from    ?FROM
//! Edt Subject [Hello]            #subject &edit=changed
//! ===
//! GFl
//! Btn [Send]                     #send    &press=send
//! Btn [Cancel]                   &press=quit
//! End
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! description → Tokenizer → Tree builder → Ui → Console loop → Screen
//!                               ↑                    ↓
//!                            Palette             Dispatcher → Handler
//! ```
//!
//! 1. [`style`]: palette text (`name : fg, bg, font`) parsed into a
//!    [`style::Palette`], resolving focused and unfocused style variants.
//! 2. [`parser`]: attribute markers, literal arguments and the stack-based
//!    tree builder.
//! 3. [`registry`]: widget ids and the string table, with `${KEY}`
//!    substitution into the description.
//! 4. [`widget`]: the widget kit: arena tree, widget kinds, default keypress
//!    behaviour.
//! 5. [`event`]: event kinds, the [`event::Handler`] trait and the handler
//!    stack.
//! 6. [`ui`]: focus navigation, dialogs, rendering and the [`ui::Console`]
//!    main loop.
//! 7. [`config`]: entry-point configuration and the binary's TOML file.

pub mod config;
pub mod errors;
pub mod event;
pub mod parser;
pub mod registry;
pub mod style;
pub mod ui;
pub mod widget;

pub use config::UiConfig;
pub use errors::{UiError, UiResult};
pub use ui::{Console, Context, DialogBuilder, Ui};
