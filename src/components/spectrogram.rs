pub const SPECTROGRAM_ID: &str = "spectrogram";

/// Canvas the spectrogram columns are painted on.
pub fn spectrogram(width: u32, height: u32) -> String {
    format!(
        r#"<canvas id="{SPECTROGRAM_ID}" class="spectrogram" width="{width}" height="{height}"></canvas>"#
    )
}
