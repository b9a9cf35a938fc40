use wasm_bindgen::JsValue;

/// Registration failures for custom elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("custom element name `{0}` must contain a hyphen (e.g. `my-element`)")]
    MissingSeparator(String),
    #[error("custom element name `{0}` must start with a lowercase ASCII letter and contain no uppercase letters")]
    InvalidName(String),
    #[error("custom element `{0}` is already defined")]
    AlreadyDefined(String),
    #[error("host rejected custom element registration: {0}")]
    Host(String),
}

/// Returned by a subscriber that could not handle a new value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures from the file-read / decode / audio-graph pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("no audio context available")]
    NoContext,
    #[error("failed to read file: {0}")]
    Read(String),
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("audio graph error: {0}")]
    Graph(String),
}

impl From<JsValue> for AudioError {
    fn from(value: JsValue) -> Self {
        Self::Graph(js_message(&value))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} range: min {min} > max {max}")]
    Range {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} default {value} outside {min}..={max}")]
    DefaultOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Failures talking to the browser DOM.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebError {
    #[error("DOM is not available")]
    DomUnavailable,
    #[error("element `{0}` not found")]
    MissingElement(String),
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_message(&value))
    }
}

impl From<WebError> for JsValue {
    fn from(value: WebError) -> Self {
        Self::from(value.to_string())
    }
}
