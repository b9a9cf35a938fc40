//! View fragments. Every function here is pure: same input, same markup.

pub mod app;
pub mod player;
pub mod spectrogram;
pub mod text;
pub mod waveform;

pub use app::app;
pub use player::{player_component, PLAYER_TAG};
pub use text::{text, TextTag};

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
