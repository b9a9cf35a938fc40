use scraper::{ElementRef, Html, Node};

/// Trims the markup and drops newlines so they do not become stray text nodes.
pub fn prepare(markup: &str) -> String {
    markup.trim().replace(['\n', '\r'], "")
}

/// Parses `markup` as a full document, removes every `<script>` element and
/// returns the body's inner HTML.
pub fn sanitize_document(markup: &str) -> String {
    let mut document = Html::parse_document(markup);

    let scripts: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| matches!(node.value(), Node::Element(el) if el.name() == "script"))
        .map(|node| node.id())
        .collect();
    if !scripts.is_empty() {
        log::warn!("stripped {} script element(s) from app markup", scripts.len());
    }
    for id in scripts {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .map(|body| body.inner_html())
        .unwrap_or_default()
}
