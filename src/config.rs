use serde::{Deserialize, Serialize};

use crate::charset::WidthPolicy;

/// Policy knobs the core itself consumes. Font/theme/window chrome is an
/// outer-application concern and stays there; this is scoped to what
/// actually changes parser/grid/image behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub scrollback_limit: usize,
    #[serde(skip)]
    pub width_change_policy: WidthPolicy,
    pub image_color_register_limit: usize,
    pub image_canvas_size_cap: (u32, u32),
    pub response_timeout_ms: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_limit: 10_000,
            width_change_policy: WidthPolicy::Auto,
            image_color_register_limit: 1024,
            image_canvas_size_cap: (4096, 4096),
            response_timeout_ms: 2_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scrollback_matches_teacher_convention() {
        assert_eq!(TerminalConfig::default().scrollback_limit, 10_000);
    }
}
