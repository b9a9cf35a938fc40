use js_sys::ArrayBuffer;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioBuffer, AudioContext, File};

use super::store::{LoadTicket, PlayerStore, StoreData};
use crate::error::{js_message, AudioError};

async fn read_file(file: &File) -> Result<ArrayBuffer, AudioError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| AudioError::Read(js_message(&e)))?;
    buffer
        .dyn_into::<ArrayBuffer>()
        .map_err(|_| AudioError::Read("not an ArrayBuffer".to_string()))
}

async fn decode(ctx: &AudioContext, bytes: &ArrayBuffer) -> Result<AudioBuffer, AudioError> {
    let promise = ctx
        .decode_audio_data(bytes)
        .map_err(|e| AudioError::Decode(js_message(&e)))?;
    let decoded = JsFuture::from(promise)
        .await
        .map_err(|e| AudioError::Decode(js_message(&e)))?;
    decoded
        .dyn_into::<AudioBuffer>()
        .map_err(|_| AudioError::Decode("not an AudioBuffer".to_string()))
}

/// Reads and decodes `file`, wires `source -> analyser -> destination`, and stores
/// every handle in `store.data`. The audio context is reused across files.
///
/// Returns `Ok(false)` when a newer load took over `ticket` meanwhile; nothing is
/// stored and the new nodes are disconnected.
pub async fn load(
    file: &File,
    store: &PlayerStore,
    ticket: LoadTicket,
    fft_size: u32,
) -> Result<bool, AudioError> {
    let bytes = read_file(file).await?;
    // Decoding detaches the buffer, so keep a copy for the store.
    let kept = bytes.slice(0);

    let ctx = match store.data.with(|d| d.and_then(|d| d.audio_context.clone())) {
        Some(ctx) => ctx,
        None => AudioContext::new().map_err(|_| AudioError::NoContext)?,
    };

    let audio_buffer = decode(&ctx, &bytes).await?;

    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(fft_size);
    let source = ctx.create_buffer_source()?;
    source.set_buffer(Some(&audio_buffer));
    source.connect_with_audio_node(&analyser)?;
    analyser.connect_with_audio_node(&ctx.destination())?;

    if !store.is_current(ticket) {
        log::debug!("discarding superseded load of {}", file.name());
        analyser.disconnect().ok();
        return Ok(false);
    }
    if let Some(previous) = store.data.with(|d| d.and_then(|d| d.analyser.clone())) {
        if let Err(e) = previous.disconnect() {
            log::warn!("cannot disconnect previous analyser: {}", js_message(&e));
        }
    }

    let duration = audio_buffer.duration();
    log::info!(
        "decoded {} ({:.2}s, {} Hz, {} ch)",
        file.name(),
        duration,
        audio_buffer.sample_rate(),
        audio_buffer.number_of_channels()
    );

    store.data.set(StoreData {
        array_buffer: Some(kept),
        audio_context: Some(ctx),
        duration,
        data_array: vec![0; analyser.frequency_bin_count() as usize],
        analyser: Some(analyser),
        audio_buffer: Some(audio_buffer),
        fft_size,
    });
    Ok(true)
}
