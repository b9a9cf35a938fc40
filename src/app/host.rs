use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Document loading progress, ordered so `>=` comparisons read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Maps `document.readyState`. Unknown values count as loaded.
    pub fn from_dom(state: &str) -> Self {
        match state {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }
}

/// What the bootstrapper needs from the page it runs in.
pub trait HostDocument {
    fn ready_state(&self) -> ReadyState;

    /// Runs `callback` on the content-loaded signal, or right away if the document
    /// is already past `Loading`. There is no way to unregister it.
    fn when_content_loaded(&self, callback: Box<dyn FnOnce()>);

    /// Replaces the inner content of the first element matching `selector`.
    /// Returns `false` when nothing matches.
    fn replace_root(&self, selector: &str, markup: &str) -> bool;
}

/// A document held in memory. Roots are addressed by the exact selector string
/// they were added under.
#[derive(Default)]
pub struct MemoryDocument {
    state: Cell<Option<ReadyState>>,
    waiting: RefCell<Vec<Box<dyn FnOnce()>>>,
    roots: RefCell<BTreeMap<String, String>>,
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("state", &self.ready_state())
            .field("waiting", &self.waiting.borrow().len())
            .field("roots", &self.roots.borrow())
            .finish()
    }
}

impl MemoryDocument {
    /// A document still loading, with no elements.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(self, selector: impl Into<String>) -> Self {
        self.roots.borrow_mut().insert(selector.into(), String::new());
        self
    }

    pub fn root_html(&self, selector: &str) -> Option<String> {
        self.roots.borrow().get(selector).cloned()
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.state.set(Some(state));
    }

    pub fn pending_listeners(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Moves to `Interactive` and runs every waiting callback in registration order.
    pub fn fire_content_loaded(&self) {
        self.set_ready_state(ReadyState::Interactive);
        let waiting = std::mem::take(&mut *self.waiting.borrow_mut());
        for callback in waiting {
            callback();
        }
    }
}

impl HostDocument for MemoryDocument {
    fn ready_state(&self) -> ReadyState {
        self.state.get().unwrap_or(ReadyState::Loading)
    }

    fn when_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        if self.ready_state() == ReadyState::Loading {
            self.waiting.borrow_mut().push(callback);
        } else {
            callback();
        }
    }

    fn replace_root(&self, selector: &str, markup: &str) -> bool {
        match self.roots.borrow_mut().get_mut(selector) {
            Some(content) => {
                *content = markup.to_string();
                true
            }
            None => false,
        }
    }
}
