use serde::Deserialize;

/// Tags a text fragment may be wrapped in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    #[default]
    P,
    Span,
    Label,
    Div,
}

impl TextTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::P => "p",
            Self::Span => "span",
            Self::Label => "label",
            Self::Div => "div",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let tag = match name.trim().to_ascii_lowercase().as_str() {
            "h1" => Self::H1,
            "h2" => Self::H2,
            "h3" => Self::H3,
            "h4" => Self::H4,
            "h5" => Self::H5,
            "h6" => Self::H6,
            "p" => Self::P,
            "span" => Self::Span,
            "label" => Self::Label,
            "div" => Self::Div,
            _ => return None,
        };
        Some(tag)
    }
}

/// `<tag>title</tag>`, with the title escaped.
pub fn text(title: &str, tag: TextTag) -> String {
    let tag = tag.as_str();
    format!("<{tag}>{}</{tag}>", super::escape(title))
}
