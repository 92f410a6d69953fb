//! A VT-compatible terminal core: a byte-stream parser, a sequence
//! dispatcher, and the grid/screen state machine they drive. This crate
//! owns no window, no font, and no PTY process — it is the part of a
//! terminal emulator that turns bytes from a shell into addressable
//! cells and back into bytes for the shell, and nothing else. Embedding
//! applications supply a [`pty::PtySource`] and an [`callbacks::EmbedderCallbacks`]
//! implementation and drive the facade with their own event loop and
//! rendering.

pub mod callbacks;
pub mod charset;
pub mod color;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod hint;
pub mod hyperlink;
pub mod image;
pub mod input;
pub mod modes;
pub mod parser;
pub mod pty;
pub mod render;
pub mod screen;
pub mod selection;
pub mod terminal;
pub mod vi;

pub use error::{Result, TerminalError};
pub use terminal::{ExecutionMode, Terminal, TerminalHandle};
