use crate::ast::Node;

/// An inline link or image with its destination resolved at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Link text, or alt text for images.
    pub label: Vec<Node>,
    pub url: String,
    pub title: Option<String>,
}

/// A link or image whose destination lives in a link definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLink {
    pub label: Vec<Node>,
    /// The label used for lookup: the explicit `[ref]` part or, for
    /// shortcut references, the link text itself.
    pub reference: String,
    /// The raw source text, rendered verbatim when the reference is unresolved.
    pub source: String,
    /// The definition this reference was pinned to while its scope was
    /// alive. `None` means it resolves through the document at render time.
    pub definition: Option<LinkDefinition>,
}

/// `[label]: url "title"`. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDefinition {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
}

impl LinkDefinition {
    pub fn new(label: impl Into<String>, url: impl Into<String>, title: Option<String>) -> Self {
        LinkDefinition {
            label: label.into(),
            url: url.into(),
            title,
        }
    }
}

/// Read-only view shared by everything that points somewhere.
pub trait IsLinkLike {
    fn url(&self) -> &str;
    fn title(&self) -> Option<&str>;
}

impl IsLinkLike for Link {
    fn url(&self) -> &str {
        &self.url
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl IsLinkLike for LinkDefinition {
    fn url(&self) -> &str {
        &self.url
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Labels match case-insensitively, with inner whitespace runs collapsed.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
