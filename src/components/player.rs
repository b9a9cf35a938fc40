use crate::config::{PlayerConfig, SliderRange};
use crate::element::{ComponentDefinition, Props};
use crate::error::ComponentError;

use super::spectrogram::spectrogram;
use super::text::{text, TextTag};
use super::waveform::waveform;
use super::escape;

pub const PLAYER_TAG: &str = "custom-player";

/// Element ids inside the player's shadow root.
pub mod ids {
    pub const FILE_INPUT: &str = "fileInput";
    pub const AUDIO: &str = "audio";
    pub const AUTOPLAY: &str = "autoplayToggle";
    pub const SCROLL_CONTAINER: &str = "scrollContainer";
    pub const ZOOM_SLIDER: &str = "zoomSlider";
    pub const SPECTROGRAM_SLIDER: &str = "spectrogramSlider";
    pub const PEAKS_LIST: &str = "peaksList";
}

const SPECTROGRAM_SIZE: (u32, u32) = (300, 150);
const WAVEFORM_SIZE: (u32, u32) = (1200, 120);

const STYLES: &str = ".row{display:flex;gap:1rem;align-items:center;margin:.5rem 0}\
.input-holder{display:inline-flex;gap:.25rem;align-items:center}\
#scrollContainer{overflow-x:auto;width:100%;border:1px solid #ccc}\
canvas{display:block;background:#0a0a0a}";

fn slider(id: &str, range: SliderRange) -> String {
    format!(
        r#"<input type="range" id="{id}" min="{}" max="{}" value="{}" step="{}" />"#,
        range.min, range.max, range.value, range.step
    )
}

/// Player markup for the given props. `tag` falls back to the configured heading
/// when missing or unknown.
pub fn render_player(props: &Props, config: &PlayerConfig) -> String {
    let title = props.get_or("title", "");
    let tag = props
        .get("tag")
        .and_then(TextTag::parse)
        .unwrap_or(config.heading);
    let checked = if config.autoplay { " checked" } else { "" };
    let (spec_w, spec_h) = SPECTROGRAM_SIZE;
    let (wave_w, wave_h) = WAVEFORM_SIZE;

    format!(
        concat!(
            "{heading}",
            r#"<input type="file" id="{file}" accept="{accept}" />"#,
            r#"<div class="row audio-holder">"#,
            r#"<audio id="{audio}" controls></audio>"#,
            r#"<label class="input-holder">Autoplay<input type="checkbox" id="{autoplay}"{checked} /></label>"#,
            "{spectrogram}",
            "</div>",
            r#"<div id="{scroll}">{waveform}</div>"#,
            r#"<div class="row">"#,
            r#"<label class="input-holder">Zoom: {zoom}</label>"#,
            r#"<label class="input-holder">Spectrogram columns: {columns}</label>"#,
            "</div>",
            "<h2>Top peaks (10%):</h2>",
            r#"<div id="{peaks}"></div>"#,
        ),
        heading = text(title, tag),
        file = ids::FILE_INPUT,
        accept = escape(&config.accept),
        audio = ids::AUDIO,
        autoplay = ids::AUTOPLAY,
        checked = checked,
        spectrogram = spectrogram(spec_w, spec_h),
        scroll = ids::SCROLL_CONTAINER,
        waveform = waveform(wave_w, wave_h),
        zoom = slider(ids::ZOOM_SLIDER, config.zoom),
        columns = slider(ids::SPECTROGRAM_SLIDER, config.spectrogram_columns),
        peaks = ids::PEAKS_LIST,
    )
}

/// The `<custom-player>` definition; re-renders when `title` or `tag` change.
pub fn player_component(config: PlayerConfig) -> Result<ComponentDefinition, ComponentError> {
    Ok(
        ComponentDefinition::new(PLAYER_TAG, move |props| render_player(props, &config))?
            .observe(["title", "tag"])
            .styles(STYLES),
    )
}
