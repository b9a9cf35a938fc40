use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, EventTarget, File, HtmlInputElement, Url};

use super::context::PlayerContext;
use crate::audio::{pipeline, PlayerStore};
use crate::config::PlayerConfig;
use crate::error::WebError;
use crate::reactive::{Reactive, Reset};
use crate::web::WebDocument;

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), WebError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners stay for the page's lifetime.
    closure.forget();
    Ok(())
}

fn slider_value(input: &HtmlInputElement) -> Option<u32> {
    input.value().trim().parse().ok()
}

/// Points the audio element at the selected file, replacing the previous object URL.
fn file_source(ctx: Rc<PlayerContext>) -> impl FnMut(&Option<File>, &Reset<Option<File>>) + 'static {
    let current_url: RefCell<Option<String>> = RefCell::new(None);
    move |file, reset| {
        if let Some(old) = current_url.borrow_mut().take() {
            if let Err(e) = Url::revoke_object_url(&old) {
                log::warn!("cannot revoke {old}: {:?}", e);
            }
        }
        let Some(file) = file else {
            ctx.audio.remove_attribute("src").ok();
            return;
        };
        let url = match Url::create_object_url_with_blob(file) {
            Ok(url) => url,
            Err(e) => {
                log::error!("cannot create object URL for {}: {:?}", file.name(), e);
                reset.reset();
                return;
            }
        };
        ctx.audio.set_src(&url);
        *current_url.borrow_mut() = Some(url);

        if ctx.autoplay.checked() {
            match ctx.audio.play() {
                Ok(promise) => spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        log::warn!("autoplay blocked: {:?}", e);
                    }
                }),
                Err(e) => log::warn!("play() failed: {:?}", e),
            }
        }
    }
}

/// Wires the player's controls to a new store and returns it.
pub fn use_player(
    ctx: Rc<PlayerContext>,
    config: &PlayerConfig,
    history_delay: Duration,
) -> Result<PlayerStore, WebError> {
    let zoom = Reactive::with_history_delay(config.zoom.value, history_delay);
    let columns = Reactive::with_history_delay(config.spectrogram_columns.value, history_delay);
    let store = PlayerStore::new(file_source(Rc::clone(&ctx)), zoom, columns);

    let base_width = ctx.waveform.width();
    let canvas_ctx = Rc::clone(&ctx);
    store.zoom.subscribe_fn(move |zoom| {
        canvas_ctx.waveform.set_width(base_width * (*zoom).max(1));
        canvas_ctx.scroll_container.set_scroll_left(0);
    });
    let canvas_ctx = Rc::clone(&ctx);
    store.columns.subscribe_fn(move |columns| {
        if let Err(e) = canvas_ctx
            .spectrogram
            .set_attribute("data-columns", &columns.to_string())
        {
            log::warn!("cannot set spectrogram columns: {:?}", e);
        }
    });

    let fft_size = config.fft_size;
    let file_store = store.clone();
    let input = ctx.file_input.clone();
    listen(&ctx.file_input, "change", move |_| {
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        file_store.file.set(Some(file.clone()));
        let ticket = file_store.begin_load();

        let store = file_store.clone();
        spawn_local(async move {
            match pipeline::load(&file, &store, ticket, fft_size).await {
                Ok(true) => log::debug!("zoom history: {:?}", store.zoom.history().await),
                Ok(false) => {}
                Err(e) => log::error!("{e}"),
            }
        });
    })?;

    let zoom_store = store.clone();
    let slider = ctx.zoom_slider.clone();
    listen(&ctx.zoom_slider, "input", move |_| {
        if let Some(v) = slider_value(&slider) {
            zoom_store.zoom.set(v);
        }
    })?;

    let columns_store = store.clone();
    let slider = ctx.spectrogram_slider.clone();
    listen(&ctx.spectrogram_slider, "input", move |_| {
        if let Some(v) = slider_value(&slider) {
            columns_store.columns.set(v);
        }
    })?;

    Ok(store)
}

/// Finds the mounted player and wires it up. Failures are logged.
pub fn init(config: &PlayerConfig, history_delay: Duration) {
    let result = WebDocument::new()
        .and_then(|doc| PlayerContext::find(doc.document()))
        .and_then(|ctx| use_player(Rc::new(ctx), config, history_delay));
    match result {
        Ok(_) => log::info!("player ready"),
        Err(e) => log::error!("player init failed: {e}"),
    }
}
