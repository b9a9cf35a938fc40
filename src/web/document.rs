use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

use crate::app::{HostDocument, ReadyState};
use crate::config::CONFIG_ATTRIBUTE;
use crate::error::WebError;

#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new() -> Result<Self, WebError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(WebError::DomUnavailable)?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// JSON config carried on `<body data-config="...">`, if any.
    pub fn config_json(&self) -> Option<String> {
        self.document
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE))
    }
}

impl HostDocument for WebDocument {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_dom(&self.document.ready_state())
    }

    fn when_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        if self.ready_state() != ReadyState::Loading {
            callback();
            return;
        }
        let listener = Closure::once_into_js(move || callback());
        if let Err(e) = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
        {
            log::error!("failed to listen for DOMContentLoaded: {:?}", e);
        }
    }

    fn replace_root(&self, selector: &str, markup: &str) -> bool {
        match self.document.query_selector(selector) {
            Ok(Some(root)) => {
                root.set_inner_html(markup);
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::error!("invalid root selector `{selector}`: {:?}", e);
                false
            }
        }
    }
}
