use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlAudioElement, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, ShadowRoot,
};

use crate::components::player::{ids, PLAYER_TAG};
use crate::components::spectrogram::SPECTROGRAM_ID;
use crate::components::waveform::WAVEFORM_ID;
use crate::error::WebError;
use crate::web::dom;

/// Every element the player hook touches, looked up inside the player's shadow root.
#[derive(Debug, Clone)]
pub struct PlayerContext {
    pub audio: HtmlAudioElement,
    pub file_input: HtmlInputElement,
    pub autoplay: HtmlInputElement,
    pub zoom_slider: HtmlInputElement,
    pub spectrogram_slider: HtmlInputElement,
    pub scroll_container: HtmlElement,
    pub peaks_list: HtmlElement,
    pub waveform: HtmlCanvasElement,
    pub spectrogram: HtmlCanvasElement,
    pub waveform_ctx: Option<CanvasRenderingContext2d>,
    pub spectrogram_ctx: Option<CanvasRenderingContext2d>,
}

fn by_id<T: JsCast>(root: &ShadowRoot, id: &str) -> Result<T, WebError> {
    root.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or_else(|| WebError::MissingElement(format!("#{id}")))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

impl PlayerContext {
    /// Looks up the first `<custom-player>` in `document`. The element must already
    /// be upgraded so its shadow root exists.
    pub fn find(document: &Document) -> Result<Self, WebError> {
        let host = dom::select(document, PLAYER_TAG)
            .first()
            .cloned()
            .ok_or_else(|| WebError::MissingElement(PLAYER_TAG.to_string()))?;
        let root = host
            .shadow_root()
            .ok_or_else(|| WebError::MissingElement(format!("{PLAYER_TAG} shadow root")))?;

        let waveform: HtmlCanvasElement = by_id(&root, WAVEFORM_ID)?;
        let spectrogram: HtmlCanvasElement = by_id(&root, SPECTROGRAM_ID)?;
        Ok(Self {
            audio: by_id(&root, ids::AUDIO)?,
            file_input: by_id(&root, ids::FILE_INPUT)?,
            autoplay: by_id(&root, ids::AUTOPLAY)?,
            zoom_slider: by_id(&root, ids::ZOOM_SLIDER)?,
            spectrogram_slider: by_id(&root, ids::SPECTROGRAM_SLIDER)?,
            scroll_container: by_id(&root, ids::SCROLL_CONTAINER)?,
            peaks_list: by_id(&root, ids::PEAKS_LIST)?,
            waveform_ctx: context_2d(&waveform),
            spectrogram_ctx: context_2d(&spectrogram),
            waveform,
            spectrogram,
        })
    }
}
