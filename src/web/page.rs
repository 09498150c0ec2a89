//! The polling viewer page served at `/`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Interval between browser polls, in milliseconds.
pub const POLL_INTERVAL_MS: u32 = 100;

/// Per-poll fetch timeout, in milliseconds.
pub const POLL_TIMEOUT_MS: u32 = 3000;

/// Page template; placeholders are substituted at render time.
const TEMPLATE: &str = include_str!("assets/viewer.html");

/// Render the viewer page for the given frame and token.
///
/// The frame is embedded as a base64 data URI; the poll script is
/// parameterized with the token the page was rendered against.
pub fn render(frame: &[u8], token: u64) -> String {
    TEMPLATE
        .replace("{poll_interval}", &POLL_INTERVAL_MS.to_string())
        .replace("{poll_timeout}", &POLL_TIMEOUT_MS.to_string())
        .replace("{token}", &token.to_string())
        .replace("{image}", &STANDARD.encode(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_frame() {
        let html = render(b"not really a png", 42);
        assert!(html.contains(&STANDARD.encode(b"not really a png")));
        assert!(html.contains("/poll?token=42"));
        assert!(html.contains("<img src=\"data:image/png;base64,"));
    }

    #[test]
    fn test_render_empty_store() {
        let html = render(&[], 0);
        assert!(html.contains("data:image/png;base64,\""));
        assert!(html.contains("/poll?token=0"));
    }

    #[test]
    fn test_no_placeholder_left_behind() {
        let html = render(b"x", 7);
        assert!(!html.contains("{poll_interval}"));
        assert!(!html.contains("{poll_timeout}"));
        assert!(!html.contains("{token}"));
        assert!(!html.contains("{image}"));
    }
}
