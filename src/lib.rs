//! sonoscope: a small in-browser audio player.
//!
//! The player is plain markup produced by pure view functions. A custom element
//! re-renders it from its attributes, an [`app::Application`] mounts it into the
//! page, and reactive cells in [`audio::PlayerStore`] connect the controls to the
//! audio graph.

pub mod app;
pub mod audio;
pub mod components;
pub mod config;
pub mod element;
pub mod error;
pub mod hooks;
pub mod reactive;
mod time;
pub mod web;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use app::{Application, Bootstrap};
use config::AppConfig;
use element::define_component;

thread_local! {
    static APP: RefCell<Option<Rc<Application>>> = const { RefCell::new(None) };
}

fn load_config(document: &web::WebDocument) -> AppConfig {
    let Some(json) = document.config_json() else {
        return AppConfig::default();
    };
    match AppConfig::from_json(&json) {
        Ok(config) => config,
        Err(e) => {
            log::error!("ignoring config: {e}");
            AppConfig::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let document = web::WebDocument::new()?;
    let config = load_config(&document);

    let markup = components::app(&config.player);
    let application = Rc::new(
        Application::new(
            config.root.clone(),
            move || markup.clone(),
            Rc::new(document),
            Rc::new(web::WebRegistry::new()),
        )
        .with_middleware_policy(config.middleware_policy),
    );

    let component_config = config.player.clone();
    let player_config = config.player.clone();
    let history_delay = config.history_delay();
    let root = config.root.clone();
    let middleware_root = config.root.clone();
    application.bootstrap(
        Bootstrap::new()
            .before_init(|| log::info!("sonoscope {}", env!("CARGO_PKG_VERSION")))
            .on_init(move || log::debug!("markup mounted into `{root}`"))
            .component(move |registry| {
                define_component(registry, components::player_component(component_config)?)
            })
            .after_init(move || hooks::init(&player_config, history_delay))
            .after_init(|| log::debug!("reactive state: {:?}", reactive::inspect::snapshot()))
            .middleware(move || log::debug!("mount into `{middleware_root}` scheduled")),
    );

    APP.with(|slot| *slot.borrow_mut() = Some(application));
    Ok(())
}

/// Debug view of the most recently created reactive cell, for the browser console.
#[wasm_bindgen]
pub fn app_state() -> Option<String> {
    reactive::inspect::snapshot()
}
