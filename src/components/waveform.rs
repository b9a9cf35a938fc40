pub const WAVEFORM_ID: &str = "waveform";

/// Canvas the waveform envelope is painted on. It lives inside the horizontally
/// scrolling container, so its width grows with the zoom level.
pub fn waveform(width: u32, height: u32) -> String {
    format!(
        r#"<canvas id="{WAVEFORM_ID}" class="waveform" width="{width}" height="{height}"></canvas>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::spectrogram::spectrogram;

    #[test]
    fn test_canvases_carry_ids_and_size() {
        assert_eq!(
            waveform(800, 120),
            r#"<canvas id="waveform" class="waveform" width="800" height="120"></canvas>"#
        );
        assert!(spectrogram(300, 150).contains(r#"id="spectrogram""#));
    }
}
