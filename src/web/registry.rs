use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::ShadowRoot;

use crate::element::{ComponentDefinition, ElementInstance, ElementRegistry};
use crate::error::{js_message, ComponentError};

// Custom elements have to be classes extending HTMLElement, which Rust cannot
// declare directly. The shim forwards the lifecycle callbacks to a WebElement.
#[wasm_bindgen(inline_js = r#"
export function define_element(tag, observed, factory) {
  class HostedElement extends HTMLElement {
    static get observedAttributes() {
      return observed;
    }
    constructor() {
      super();
      const root = this.attachShadow({ mode: "open" });
      const attrs = this.getAttributeNames().map((name) => [name, this.getAttribute(name)]);
      this._handle = factory(root, attrs);
    }
    connectedCallback() {
      this._handle.connected();
    }
    attributeChangedCallback(name, _oldValue, newValue) {
      this._handle.attribute_changed(name, newValue);
    }
  }
  customElements.define(tag, HostedElement);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn define_element(tag: &str, observed: Array, factory: &JsValue) -> Result<(), JsValue>;
}

/// One live custom element, owned by its JS host object.
#[wasm_bindgen]
pub struct WebElement {
    instance: ElementInstance<ShadowRoot>,
}

#[wasm_bindgen]
impl WebElement {
    pub fn connected(&mut self) {
        self.instance.connected();
    }

    pub fn attribute_changed(&mut self, name: &str, value: Option<String>) {
        self.instance.attribute_changed(name, value.as_deref());
    }
}

fn attribute_pairs(attrs: &Array) -> Vec<(String, String)> {
    attrs
        .iter()
        .filter_map(|entry| {
            let pair = Array::from(&entry);
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

/// `window.customElements`, plus a record of what this process defined.
#[derive(Debug, Default)]
pub struct WebRegistry {
    defined: RefCell<BTreeSet<String>>,
}

impl WebRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ElementRegistry for WebRegistry {
    fn define(&self, definition: Rc<ComponentDefinition>) -> Result<(), ComponentError> {
        let tag = definition.tag().to_string();
        let observed: Array = definition
            .observed_attributes()
            .iter()
            .map(|a| JsValue::from_str(a))
            .collect();

        let factory = Closure::<dyn Fn(ShadowRoot, Array) -> JsValue>::new(
            move |root: ShadowRoot, attrs: Array| {
                let instance =
                    ElementInstance::new(Rc::clone(&definition), attribute_pairs(&attrs), root);
                JsValue::from(WebElement { instance })
            },
        );

        define_element(&tag, observed, factory.as_ref())
            .map_err(|e| ComponentError::Host(js_message(&e)))?;
        // Definitions live as long as the page.
        factory.forget();

        log::info!("registered <{tag}>");
        self.defined.borrow_mut().insert(tag);
        Ok(())
    }

    fn is_defined(&self, tag: &str) -> bool {
        self.defined.borrow().contains(tag)
    }
}
