use wasm_bindgen::JsCast;
use web_sys::{Document, Element, NodeList};

/// Result of a selector query.
#[derive(Debug, Clone)]
pub enum Selection {
    None,
    One(Element),
    Many(Vec<Element>),
}

impl Selection {
    pub fn first(&self) -> Option<&Element> {
        match self {
            Self::None => None,
            Self::One(el) => Some(el),
            Self::Many(all) => all.first(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Many(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Queries the whole document. Invalid selectors select nothing.
pub fn select(document: &Document, selector: &str) -> Selection {
    let found = match document.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            log::warn!("bad selector `{selector}`: {:?}", e);
            Vec::new()
        }
    };
    match found.len() {
        0 => Selection::None,
        1 => found.into_iter().next().map_or(Selection::None, Selection::One),
        _ => Selection::Many(found),
    }
}
