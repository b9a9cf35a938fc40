use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use scraper::{Html, Node};

use super::{ComponentDefinition, ContentRoot, ElementInstance, ElementRegistry};
use crate::error::ComponentError;

/// Content root that keeps the rendered markup as a string.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoot(Rc<RefCell<String>>);

impl MemoryRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> String {
        self.0.borrow().clone()
    }
}

impl ContentRoot for MemoryRoot {
    fn replace_content(&self, markup: &str) {
        *self.0.borrow_mut() = markup.to_string();
    }
}

/// In-process element registry, for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    definitions: RefCell<BTreeMap<String, Rc<ComponentDefinition>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(&self, tag: &str) -> Option<Rc<ComponentDefinition>> {
        self.definitions.borrow().get(tag).cloned()
    }

    pub fn tags(&self) -> Vec<String> {
        self.definitions.borrow().keys().cloned().collect()
    }

    /// Creates an unattached instance of a defined tag.
    pub fn create<I, K, V>(&self, tag: &str, attributes: I) -> Option<ElementInstance<MemoryRoot>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let definition = self.definition(tag)?;
        Some(ElementInstance::new(definition, attributes, MemoryRoot::new()))
    }

    /// Finds every element of a defined tag in `markup`, in document order, and
    /// connects a fresh instance for each one.
    pub fn upgrade(&self, markup: &str) -> Vec<ElementInstance<MemoryRoot>> {
        let fragment = Html::parse_fragment(markup);
        fragment
            .tree
            .values()
            .filter_map(|node| match node {
                Node::Element(el) => Some(el),
                _ => None,
            })
            .filter_map(|el| {
                let attrs = el.attrs().map(|(k, v)| (k.to_string(), v.to_string()));
                let mut instance = self.create(el.name(), attrs)?;
                instance.connected();
                Some(instance)
            })
            .collect()
    }
}

impl ElementRegistry for MemoryRegistry {
    fn define(&self, definition: Rc<ComponentDefinition>) -> Result<(), ComponentError> {
        let tag = definition.tag().to_string();
        let mut definitions = self.definitions.borrow_mut();
        if definitions.contains_key(&tag) {
            return Err(ComponentError::AlreadyDefined(tag));
        }
        definitions.insert(tag, definition);
        Ok(())
    }

    fn is_defined(&self, tag: &str) -> bool {
        self.definitions.borrow().contains_key(tag)
    }
}
