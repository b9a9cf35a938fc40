use std::cell::Cell;
use std::rc::Rc;

use js_sys::ArrayBuffer;
use web_sys::{AnalyserNode, AudioBuffer, AudioContext, File};

use crate::reactive::{Reactive, ReactiveCell, Reset};

/// Handles and buffers for the currently loaded file.
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    pub array_buffer: Option<ArrayBuffer>,
    pub audio_context: Option<AudioContext>,
    pub duration: f64,
    pub analyser: Option<AnalyserNode>,
    pub audio_buffer: Option<AudioBuffer>,
    pub data_array: Vec<u8>,
    pub fft_size: u32,
}

/// Marks one file load; only the most recent ticket may publish its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Reactive state behind one player element.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    pub file: ReactiveCell<Option<File>>,
    pub data: ReactiveCell<StoreData>,
    pub zoom: Reactive<u32>,
    pub columns: Reactive<u32>,
    loads: Rc<Cell<u64>>,
}

impl PlayerStore {
    /// `on_file` runs on every file selection.
    pub fn new(
        on_file: impl FnMut(&Option<File>, &Reset<Option<File>>) + 'static,
        zoom: Reactive<u32>,
        columns: Reactive<u32>,
    ) -> Self {
        let file = ReactiveCell::with_callback(None, on_file);
        let data = ReactiveCell::new(StoreData::default());
        Self {
            file,
            data,
            zoom,
            columns,
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Starts a new load, superseding any still in flight.
    pub fn begin_load(&self) -> LoadTicket {
        let next = self.loads.get() + 1;
        self.loads.set(next);
        LoadTicket(next)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.loads.get() == ticket.0
    }

    pub fn duration(&self) -> f64 {
        self.data.with(|d| d.map_or(0.0, |d| d.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = PlayerStore::new(|_, _| {}, Reactive::new(1), Reactive::new(7));
        assert!(store.file.get().is_some_and(|f| f.is_none()));
        assert_eq!(store.duration(), 0.0);
        assert!(store.data.with(|d| d.is_some_and(|d| d.analyser.is_none())));
    }

    #[test]
    fn test_file_callback_sees_every_selection() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let store = PlayerStore::new(
            move |_, _| seen.set(seen.get() + 1),
            Reactive::new(1),
            Reactive::new(7),
        );
        store.file.set(None);
        store.file.set(None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_newer_load_supersedes_older() {
        let store = PlayerStore::new(|_, _| {}, Reactive::new(1), Reactive::new(7));
        let first = store.begin_load();
        assert!(store.is_current(first));

        let second = store.clone().begin_load();
        assert!(!store.is_current(first));
        assert!(store.is_current(second));
    }

    #[test]
    fn test_store_data_is_inspectable() {
        let store = PlayerStore::new(|_, _| {}, Reactive::new(1), Reactive::new(7));
        let snapshot = crate::reactive::inspect::snapshot().unwrap();
        assert!(snapshot.contains("fft_size: 0"));
        drop(store);
    }
}
