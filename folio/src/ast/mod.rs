//! The document tree.
//!
//! [`Node`] is a closed sum type over every block and inline kind. Trees own
//! their children exclusively; the one exception is [`FunctionCallNode`],
//! which is reference counted so the context's pending-call queue can reach
//! it, and whose children are filled in once by expansion.

mod call;
mod layout;
mod link;

use std::rc::Rc;

pub use call::FunctionCallNode;
pub use layout::{Alignment, BoxStyle, Clip, Orientation};
pub use link::{IsLinkLike, Link, LinkDefinition, ReferenceLink, normalize_label};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Block-level
    Heading {
        level: u8,
        text: String,
        children: Vec<Node>,
    },
    Paragraph {
        text: String,
        children: Vec<Node>,
    },
    /// A line no other block rule claimed.
    BlockText {
        text: String,
        children: Vec<Node>,
    },
    BlockQuote(Vec<Node>),
    List {
        ordered: bool,
        start: u64,
        /// Loose lists wrap item content in paragraphs.
        loose: bool,
        items: Vec<Node>,
    },
    ListItem(Vec<Node>),
    Code {
        language: Option<String>,
        content: String,
    },
    HorizontalRule,
    Html(String),
    LinkDefinition(LinkDefinition),
    Math(String),
    FunctionCall(Rc<FunctionCallNode>),
    Aligned {
        alignment: Alignment,
        children: Vec<Node>,
    },
    Stacked {
        orientation: Orientation,
        main_axis: Alignment,
        cross_axis: Alignment,
        gap: Option<String>,
        children: Vec<Node>,
    },
    Clipped {
        clip: Clip,
        children: Vec<Node>,
    },
    Box {
        style: BoxStyle,
        children: Vec<Node>,
    },
    PageBreak,
    Whitespace {
        width: Option<String>,
        height: Option<String>,
    },
    Newline,

    // Inline
    Text(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    StrongEmphasis(Vec<Node>),
    Strikethrough(Vec<Node>),
    CodeSpan(String),
    LineBreak,
    Comment(String),
    Link(Link),
    ReferenceLink(ReferenceLink),
    Image(Link),
    ReferenceImage(ReferenceLink),
    MathSpan(String),
    /// A character that needs escaping in tag-based output (`&`, `<`, `>`).
    CriticalContent(String),
}

impl Node {
    pub fn text_node(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Raw text carried by text-bearing nodes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Heading { text, .. } | Node::Paragraph { text, .. } | Node::BlockText { text, .. } => Some(text),
            Node::Code { content, .. } => Some(content),
            Node::Html(text)
            | Node::Math(text)
            | Node::Text(text)
            | Node::CodeSpan(text)
            | Node::Comment(text)
            | Node::MathSpan(text)
            | Node::CriticalContent(text) => Some(text),
            _ => None,
        }
    }

    /// Child nodes of containers. A function call exposes its expansion.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children, .. }
            | Node::BlockText { children, .. }
            | Node::Aligned { children, .. }
            | Node::Stacked { children, .. }
            | Node::Clipped { children, .. }
            | Node::Box { children, .. } => Some(children),
            Node::List { items, .. } => Some(items),
            Node::BlockQuote(children)
            | Node::ListItem(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::StrongEmphasis(children)
            | Node::Strikethrough(children) => Some(children),
            Node::Link(link) | Node::Image(link) => Some(&link.label),
            Node::ReferenceLink(link) | Node::ReferenceImage(link) => Some(&link.label),
            Node::FunctionCall(call) => Some(call.children()),
            _ => None,
        }
    }

    /// Owned children. Expanded call content is shared and not reachable here.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Heading { children, .. }
            | Node::Paragraph { children, .. }
            | Node::BlockText { children, .. }
            | Node::Aligned { children, .. }
            | Node::Stacked { children, .. }
            | Node::Clipped { children, .. }
            | Node::Box { children, .. } => Some(children),
            Node::List { items, .. } => Some(items),
            Node::BlockQuote(children)
            | Node::ListItem(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::StrongEmphasis(children)
            | Node::Strikethrough(children) => Some(children),
            Node::Link(link) | Node::Image(link) => Some(&mut link.label),
            Node::ReferenceLink(link) | Node::ReferenceImage(link) => Some(&mut link.label),
            _ => None,
        }
    }

    /// Links and images with an inline destination.
    pub fn link_like(&self) -> Option<&dyn IsLinkLike> {
        match self {
            Node::Link(link) | Node::Image(link) => Some(link),
            Node::LinkDefinition(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Node::Text(_)
                | Node::Emphasis(_)
                | Node::Strong(_)
                | Node::StrongEmphasis(_)
                | Node::Strikethrough(_)
                | Node::CodeSpan(_)
                | Node::LineBreak
                | Node::Comment(_)
                | Node::Link(_)
                | Node::ReferenceLink(_)
                | Node::Image(_)
                | Node::ReferenceImage(_)
                | Node::MathSpan(_)
                | Node::CriticalContent(_)
        ) || matches!(self, Node::FunctionCall(call) if !call.is_block)
    }

    /// Depth-first, pre-order visit of this node and everything below it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// Concatenated text of all leaves, ignoring markup.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| match node {
            Node::Text(text) | Node::CodeSpan(text) | Node::MathSpan(text) | Node::CriticalContent(text) => {
                out.push_str(text)
            }
            Node::LineBreak => out.push('\n'),
            _ => {}
        });
        out
    }
}

/// Visits every function call in `nodes`, including calls nested in
/// already-expanded content.
pub fn function_calls(nodes: &[Node]) -> Vec<Rc<FunctionCallNode>> {
    let mut calls = Vec::new();
    for node in nodes {
        node.walk(&mut |n| {
            if let Node::FunctionCall(call) = n {
                calls.push(Rc::clone(call));
            }
        });
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities() {
        let paragraph = Node::Paragraph {
            text: "a *b*".into(),
            children: vec![
                Node::text_node("a "),
                Node::Emphasis(vec![Node::text_node("b")]),
            ],
        };
        assert_eq!(paragraph.text(), Some("a *b*"));
        assert_eq!(paragraph.children().map(<[Node]>::len), Some(2));
        assert!(paragraph.link_like().is_none());
        assert_eq!(paragraph.plain_text(), "a b");
        assert!(!paragraph.is_inline());

        let link = Node::Link(Link {
            label: vec![Node::text_node("x")],
            url: "https://example.com".into(),
            title: Some("t".into()),
        });
        let like = link.link_like().unwrap();
        assert_eq!(like.url(), "https://example.com");
        assert_eq!(like.title(), Some("t"));
        assert!(link.is_inline());
    }

    #[test]
    fn calls_are_found_inside_expansions() {
        let inner = Rc::new(FunctionCallNode::new("inner", vec![], 0..1, false));
        let outer = Rc::new(FunctionCallNode::new("outer", vec![], 0..1, true));
        outer
            .set_children(vec![Node::FunctionCall(Rc::clone(&inner))])
            .unwrap();
        let calls = function_calls(&[Node::FunctionCall(outer)]);
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
    }
}
