use std::rc::Rc;

use uuid::Uuid;

use super::{ComponentDefinition, Props};

/// The isolated subtree an element renders into.
pub trait ContentRoot {
    /// Replaces everything under the root with `markup`.
    fn replace_content(&self, markup: &str);
}

impl ContentRoot for web_sys::ShadowRoot {
    fn replace_content(&self, markup: &str) {
        self.set_inner_html(markup);
    }
}

/// One live element: its props and its content root.
#[derive(Debug)]
pub struct ElementInstance<R> {
    definition: Rc<ComponentDefinition>,
    props: Props,
    root: R,
    renders: usize,
}

impl<R: ContentRoot> ElementInstance<R> {
    /// Seeds props from the attributes present on the host element.
    pub fn new<I, K, V>(definition: Rc<ComponentDefinition>, attributes: I, root: R) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            definition,
            props: attributes.into_iter().collect(),
            root,
            renders: 0,
        }
    }

    /// First attachment to the document.
    pub fn connected(&mut self) {
        self.render();
    }

    /// Merges one attribute change and re-renders. `None` means the attribute was
    /// removed. Returns `false` for attributes the definition does not observe.
    pub fn attribute_changed(&mut self, name: &str, value: Option<&str>) -> bool {
        if !self.definition.is_observed(name) {
            return false;
        }
        let name = name.to_ascii_lowercase();
        match value {
            Some(value) => self.props.insert(name, value),
            None => {
                self.props.remove(&name);
            }
        }
        self.render();
        true
    }

    pub fn render(&mut self) {
        let markup = self.markup();
        self.root.replace_content(&markup);
        self.renders += 1;
    }

    /// Style block (fresh id per render) followed by the component markup.
    pub fn markup(&self) -> String {
        let body = self.definition.render(&self.props);
        match self.definition.style_text() {
            Some(css) => format!(
                "<style id=\"{}\">{css}</style>{body}",
                Uuid::new_v4()
            ),
            None => body,
        }
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn root(&self) -> &R {
        &self.root
    }

    pub fn tag(&self) -> &str {
        self.definition.tag()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}
