//! Browser implementations of the host traits, on top of `web-sys`.

pub mod dom;
mod document;
mod registry;

pub use document::WebDocument;
pub use registry::{WebElement, WebRegistry};
