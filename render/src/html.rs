use folio::ast::{BoxStyle, Link, ReferenceLink};
use folio::{Context, Node};
use log::warn;

use crate::{NodeRenderer, TagBuilder};

/// Math is typeset client-side, which needs text delimiters rather than tags.
pub const BLOCK_MATH_FENCE: &str = "__BLOCK_MATH__";
pub const INLINE_MATH_FENCE: &str = "__INLINE_MATH__";

pub struct HtmlRenderer<'c> {
    context: &'c Context,
    pretty: bool,
}

impl<'c> HtmlRenderer<'c> {
    pub fn new(context: &'c Context) -> Self {
        HtmlRenderer {
            context,
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// A block-level tag, formatted according to the `pretty` setting.
    fn block(&self, name: &str) -> TagBuilder {
        TagBuilder::new(name).pretty(self.pretty)
    }

    fn container(&mut self, name: &str, children: &[Node]) -> String {
        let content = self.render_all(children);
        self.block(name).child(content).build()
    }

    fn inline(&mut self, name: &str, children: &[Node]) -> String {
        let content = self.render_all(children);
        TagBuilder::new(name).child(content).build()
    }

    fn div(&mut self, class: &str, children: &[Node]) -> String {
        let content = self.render_all(children);
        self.block("div").class(class).child(content).build()
    }

    fn list_item(&mut self, item: &Node, loose: bool) -> String {
        let Node::ListItem(children) = item else {
            return self.render(item);
        };
        if loose {
            return self.container("li", children);
        }
        // Tight lists drop the paragraph wrapper around item text.
        let content: Vec<String> = children
            .iter()
            .map(|child| match child {
                Node::Paragraph { children, .. } => self.render_all(children),
                other => self.render(other),
            })
            .collect();
        TagBuilder::new("li").child(content.join("\n")).build()
    }

    fn link(&mut self, link: &Link) -> String {
        let label = self.render_all(&link.label);
        TagBuilder::new("a")
            .attribute("href", &link.url)
            .optional_attribute("title", link.title.as_deref())
            .child(label)
            .build()
    }

    fn image(&self, link: &Link) -> String {
        let alt: String = link.label.iter().map(Node::plain_text).collect();
        TagBuilder::new("img")
            .attribute("src", &link.url)
            .attribute("alt", alt)
            .optional_attribute("title", link.title.as_deref())
            .void()
            .build()
    }

    /// Uses the pinned definition, else resolves through the context.
    /// Unresolved references keep their source text.
    fn reference(&mut self, reference: &ReferenceLink, image: bool) -> String {
        let definition = reference
            .definition
            .clone()
            .or_else(|| self.context.link_definition(&reference.reference));
        let Some(definition) = definition else {
            return html_escape::encode_text(&reference.source).into_owned();
        };
        let link = Link {
            label: reference.label.clone(),
            url: definition.url,
            title: definition.title,
        };
        if image { self.image(&link) } else { self.link(&link) }
    }

    fn boxed(&mut self, style: &BoxStyle, children: &[Node]) -> String {
        let mut tag = self.block("div").class("box");
        if let Some(title) = &style.title {
            let header = TagBuilder::new("header")
                .style("color", style.foreground.as_deref())
                .style("padding", style.padding.as_deref())
                .child(TagBuilder::new("h4").text(title).build())
                .build();
            tag = tag.child(header);
        }
        let content = self.render_all(children);
        let body = self
            .block("div")
            .class("box-content")
            .style("padding", style.padding.as_deref())
            .child(content)
            .build();
        tag.child(body)
            .style("background-color", style.background.as_deref())
            .style("color", style.foreground.as_deref())
            .build()
    }
}

impl NodeRenderer for HtmlRenderer<'_> {
    fn render(&mut self, node: &Node) -> String {
        match node {
            // -----------------------------------------------------------------
            // Block-level
            // -----------------------------------------------------------------
            Node::Heading { level, children, .. } => self.container(&format!("h{}", level), children),
            Node::Paragraph { children, .. } | Node::BlockText { children, .. } => self.container("p", children),
            Node::BlockQuote(children) => self.container("blockquote", children),
            Node::List {
                ordered,
                start,
                loose,
                items,
            } => {
                let mut tag = self.block(if *ordered { "ol" } else { "ul" });
                if *ordered && *start != 1 {
                    tag = tag.attribute("start", start);
                }
                for item in items {
                    tag = tag.child(self.list_item(item, *loose));
                }
                tag.build()
            }
            Node::ListItem(_) => self.list_item(node, true),
            Node::Code { language, content } => {
                let code = TagBuilder::new("code")
                    .optional_attribute("class", language.as_ref().map(|l| format!("language-{}", l)))
                    .text(content)
                    .build();
                TagBuilder::new("pre").child(code).build()
            }
            Node::HorizontalRule => TagBuilder::new("hr").void().build(),
            Node::Html(html) => html.clone(),
            // Definitions only feed reference resolution.
            Node::LinkDefinition(_) => String::new(),
            Node::Math(expression) => format!(
                "{fence}${}${fence}",
                html_escape::encode_text(expression),
                fence = BLOCK_MATH_FENCE
            ),
            Node::FunctionCall(call) => {
                if !call.is_expanded() {
                    warn!("rendering unexpanded call .{}", call.name);
                }
                self.render_all(call.children())
            }
            Node::Aligned { alignment, children } => self.div(&format!("align align-{}", alignment), children),
            Node::Stacked {
                orientation,
                main_axis,
                cross_axis,
                gap,
                children,
            } => {
                let direction = match orientation {
                    folio::ast::Orientation::Horizontal => "row",
                    folio::ast::Orientation::Vertical => "column",
                };
                let content = self.render_all(children);
                self.block("div")
                    .class(format!("stack stack-{}", direction))
                    .style("justify-content", Some(main_axis))
                    .style("align-items", Some(cross_axis))
                    .style("gap", gap.as_deref())
                    .child(content)
                    .build()
            }
            Node::Clipped { clip, children } => self.div(&format!("clip-{}", clip.as_str()), children),
            Node::Box { style, children } => self.boxed(style, children),
            Node::PageBreak => self.block("div").class("page-break").build(),
            Node::Whitespace { width, height } => TagBuilder::new("span")
                .style("width", width.as_deref())
                .style("height", height.as_deref())
                .build(),
            Node::Newline => String::new(),

            // -----------------------------------------------------------------
            // Inline
            // -----------------------------------------------------------------
            Node::Text(text) | Node::CriticalContent(text) => html_escape::encode_text(text).into_owned(),
            Node::Emphasis(children) => self.inline("em", children),
            Node::Strong(children) => self.inline("strong", children),
            Node::StrongEmphasis(children) => {
                let strong = self.inline("strong", children);
                TagBuilder::new("em").child(strong).build()
            }
            Node::Strikethrough(children) => self.inline("del", children),
            Node::CodeSpan(code) => TagBuilder::new("code").text(code).build(),
            Node::LineBreak => TagBuilder::new("br").void().build(),
            // Source comments never reach the output.
            Node::Comment(_) => String::new(),
            Node::Link(link) => self.link(link),
            Node::ReferenceLink(reference) => self.reference(reference, false),
            Node::Image(link) => self.image(link),
            Node::ReferenceImage(reference) => self.reference(reference, true),
            Node::MathSpan(expression) => format!(
                "{fence}${}${fence}",
                html_escape::encode_text(expression),
                fence = INLINE_MATH_FENCE
            ),
        }
    }

    fn render_all(&mut self, nodes: &[Node]) -> String {
        let separator = if self.pretty { "\n" } else { "" };
        let mut out = String::new();
        for node in nodes {
            let fragment = self.render(node);
            if fragment.is_empty() {
                continue;
            }
            if !out.is_empty() && !node.is_inline() {
                out.push_str(separator);
            }
            out.push_str(&fragment);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::Flavor;
    use folio::parser::parse_blocks;
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        let context = Context::new(Flavor::extended().unwrap());
        let nodes = parse_blocks(source, &context).unwrap();
        HtmlRenderer::new(&context).render_all(&nodes)
    }

    #[test]
    fn paragraphs_and_emphasis() {
        assert_eq!(render("Hello **bold** & *em*\n"), "<p>Hello <strong>bold</strong> &amp; <em>em</em></p>");
    }

    #[test]
    fn tight_and_loose_lists() {
        assert_eq!(render("- a\n- b\n"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(render("2. a\n\n3. b\n"), r#"<ol start="2"><li><p>a</p></li><li><p>b</p></li></ol>"#);
    }

    #[test]
    fn references_resolve_or_stay_verbatim() {
        assert_eq!(
            render("[docs]: https://example.com\n\nSee [docs] and [nothing].\n"),
            r#"<p>See <a href="https://example.com">docs</a> and [nothing].</p>"#
        );
    }

    #[test]
    fn code_is_escaped() {
        assert_eq!(
            render("```html\n<b>\n```\n"),
            "<pre><code class=\"language-html\">&lt;b&gt;\n</code></pre>"
        );
    }

    #[test]
    fn math_uses_text_fences() {
        assert_eq!(render("$ a < b $\n"), "__BLOCK_MATH__$a &lt; b$__BLOCK_MATH__");
    }

    #[test]
    fn unexpanded_calls_render_nothing() {
        assert_eq!(render(".missing {x}\n"), "");
    }
}
