//! Output renderers for expanded document trees.
//!
//! Every renderer matches exhaustively over [`Node`], so each node kind has a
//! defined output, even if that output is deliberately empty.

pub mod html;
pub mod plain;
mod tag;

pub use html::HtmlRenderer;
pub use plain::PlainTextRenderer;
pub use tag::TagBuilder;

use folio::Node;

/// Converts nodes into output text of one format.
pub trait NodeRenderer {
    fn render(&mut self, node: &Node) -> String;

    fn render_all(&mut self, nodes: &[Node]) -> String {
        nodes.iter().map(|node| self.render(node)).collect()
    }
}
