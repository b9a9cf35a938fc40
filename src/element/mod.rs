//! Custom element adapter.
//!
//! A [`ComponentDefinition`] binds a tag name to a pure render function, optional
//! CSS, and the attributes it reacts to. Registries turn definitions into live
//! elements: [`crate::web::WebRegistry`] through `customElements.define`,
//! [`MemoryRegistry`] in-process.
//!
//! Every attribute change re-renders the whole content root. `render` must be a
//! pure, total function of the props it is given; nothing written by a previous
//! render survives.

mod instance;
mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ComponentError;

pub use instance::{ContentRoot, ElementInstance};
pub use memory::{MemoryRegistry, MemoryRoot};

/// Attribute values of one element instance. Values are kept as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

pub type RenderFn = Rc<dyn Fn(&Props) -> String>;

/// Checks a custom element name against the platform naming rules we care about.
pub fn validate_tag(tag: &str) -> Result<(), ComponentError> {
    if !tag.contains('-') {
        return Err(ComponentError::MissingSeparator(tag.to_string()));
    }
    let starts_lower = tag.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    if !starts_lower || tag.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ComponentError::InvalidName(tag.to_string()));
    }
    Ok(())
}

pub struct ComponentDefinition {
    tag: String,
    observed: Vec<String>,
    render: RenderFn,
    styles: Option<String>,
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("tag", &self.tag)
            .field("observed", &self.observed)
            .field("styles", &self.styles.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

impl ComponentDefinition {
    /// Fails if `tag` is not a valid custom element name.
    pub fn new(
        tag: impl Into<String>,
        render: impl Fn(&Props) -> String + 'static,
    ) -> Result<Self, ComponentError> {
        let tag = tag.into();
        validate_tag(&tag)?;
        Ok(Self {
            tag,
            observed: Vec::new(),
            render: Rc::new(render),
            styles: None,
        })
    }

    /// Declares attributes whose changes trigger a re-render.
    pub fn observe<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for attr in attributes {
            let attr = attr.as_ref().to_ascii_lowercase();
            if !self.observed.contains(&attr) {
                self.observed.push(attr);
            }
        }
        self
    }

    pub fn styles(mut self, css: impl Into<String>) -> Self {
        self.styles = Some(css.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    pub fn is_observed(&self, name: &str) -> bool {
        self.observed.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn style_text(&self) -> Option<&str> {
        self.styles.as_deref()
    }

    pub fn render(&self, props: &Props) -> String {
        (self.render)(props)
    }
}

/// Somewhere definitions can be registered.
pub trait ElementRegistry {
    fn define(&self, definition: Rc<ComponentDefinition>) -> Result<(), ComponentError>;

    fn is_defined(&self, tag: &str) -> bool;
}

/// Registers `definition`. A tag can only be defined once per registry.
pub fn define_component(
    registry: &dyn ElementRegistry,
    definition: ComponentDefinition,
) -> Result<(), ComponentError> {
    if registry.is_defined(definition.tag()) {
        return Err(ComponentError::AlreadyDefined(definition.tag().to_string()));
    }
    log::debug!(
        "defining <{}> observing {:?}",
        definition.tag(),
        definition.observed_attributes()
    );
    registry.define(Rc::new(definition))
}
