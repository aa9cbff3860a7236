use folio::Node;

use crate::NodeRenderer;

/// Renders text content only, one line per block.
#[derive(Debug, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn new() -> Self {
        PlainTextRenderer
    }

    fn line(&mut self, children: &[Node]) -> String {
        let mut line = self.render_all(children);
        line.push('\n');
        line
    }
}

impl NodeRenderer for PlainTextRenderer {
    fn render(&mut self, node: &Node) -> String {
        match node {
            Node::Heading { children, .. } | Node::Paragraph { children, .. } | Node::BlockText { children, .. } => {
                self.line(children)
            }
            Node::Code { content, .. } => content.clone(),
            Node::Math(expression) => format!("{}\n", expression),
            Node::HorizontalRule | Node::PageBreak => "\n".to_string(),
            Node::ListItem(children) => {
                let content = self.render_all(children);
                format!("- {}", content)
            }
            Node::BlockQuote(children)
            | Node::List { items: children, .. }
            | Node::Aligned { children, .. }
            | Node::Stacked { children, .. }
            | Node::Clipped { children, .. }
            | Node::Box { children, .. }
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::StrongEmphasis(children)
            | Node::Strikethrough(children) => self.render_all(children),
            Node::FunctionCall(call) => self.render_all(call.children()),
            Node::Link(link) | Node::Image(link) => self.render_all(&link.label),
            Node::ReferenceLink(reference) | Node::ReferenceImage(reference) => self.render_all(&reference.label),
            Node::Text(text) | Node::CodeSpan(text) | Node::MathSpan(text) | Node::CriticalContent(text) => text.clone(),
            Node::LineBreak => "\n".to_string(),
            Node::Html(_)
            | Node::LinkDefinition(_)
            | Node::Whitespace { .. }
            | Node::Newline
            | Node::Comment(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::parser::parse_blocks;
    use folio::{Context, Flavor};

    #[test]
    fn strips_markup() {
        let context = Context::new(Flavor::extended().unwrap());
        let nodes = parse_blocks("# Title\n\nSome **bold** [link](x).\n\n- a\n- b\n", &context).unwrap();
        let text = PlainTextRenderer::new().render_all(&nodes);
        assert_eq!(text, "Title\nSome bold link.\n- a\n- b\n");
    }
}
