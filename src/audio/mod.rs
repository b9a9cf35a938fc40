//! Audio wiring: the player store and the decode/analyser pipeline.
//!
//! Analysis math (peaks, spectrogram columns) stays with the canvas renderers;
//! this module only builds the graph and keeps the handles.

pub mod pipeline;
pub mod store;

pub use store::{PlayerStore, StoreData};
