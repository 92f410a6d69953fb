use std::io;

use thiserror::Error;

/// Errors that can cross the core's external boundary.
///
/// Internal recoveries (malformed CSI, out-of-range params, truncated
/// UTF-8) are not represented here — they clamp, log, and continue by
/// construction instead of bubbling a `Result` up through the parser.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("pty io error: {0}")]
    Pty(#[from] io::Error),

    #[error("clipboard unavailable")]
    ClipboardUnavailable,

    #[error("image decode failed: {0}")]
    ImageDecode(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
