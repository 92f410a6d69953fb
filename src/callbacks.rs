//! The embedder boundary: everything the core needs an outer
//! application for instead of doing itself (clipboard access, window
//! title, bell, external process interaction). The facade calls these
//! synchronously from within its single coarse lock, so implementations
//! must not re-enter the facade.

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardSelection {
    Primary,
    Clipboard,
}

pub trait EmbedderCallbacks {
    fn on_bell(&mut self) {}
    fn on_title_change(&mut self, _title: &str) {}
    fn on_icon_name_change(&mut self, _name: &str) {}
    fn on_cwd_change(&mut self, _path: &str) {}

    /// OSC 52: the client wants to write `text` to the given selection.
    fn on_copy_to_clipboard(&mut self, _selection: ClipboardSelection, _text: &str) {}

    /// OSC 52 read form (`?` payload): the client is asking for the
    /// current clipboard contents. The embedder should answer
    /// asynchronously by feeding the corresponding OSC 52 response back
    /// through the facade's PTY-input path, since the core has no
    /// synchronous way to block on an OS clipboard round trip.
    fn on_request_clipboard(&mut self, _selection: ClipboardSelection) {}

    fn on_color_query(&mut self, _which: ColorQuery) -> Option<Color> {
        None
    }

    fn on_mouse_mode_changed(&mut self, _enabled: bool) {}
    fn on_alt_screen_entered(&mut self) {}
    fn on_alt_screen_exited(&mut self) {}
    fn on_hyperlink_hover(&mut self, _uri: Option<&str>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorQuery {
    Foreground,
    Background,
    Cursor,
    Indexed(u8),
}

/// No-op implementation for headless/test use.
#[derive(Debug, Default)]
pub struct NullCallbacks;

impl EmbedderCallbacks for NullCallbacks {}
