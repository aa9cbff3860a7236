//! Token streams to nodes.
//!
//! Containers (block quotes, lists, list items) re-lex their inner text and
//! recurse, and text-bearing blocks run the inline lexer over their text.
//! Malformed input never fails to parse: the grammars route anything they do
//! not recognize to plainer node kinds. The only error is a stalled lexer.
//! Content nested deeper than [`MAX_NESTING_DEPTH`] is kept as plain text.

mod arguments;

use std::rc::Rc;
use std::sync::Arc;

use log::debug;

use crate::ast::{FunctionCallNode, Link, LinkDefinition, Node, ReferenceLink};
use crate::context::Context;
use crate::function::FunctionCallArgument;
use crate::lexer::{LexError, Token, TokenKind};

pub(crate) use arguments::dedent;

/// How many containers and inline spans may nest before the rest of the
/// content is kept as unparsed text.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parses a whole document (or any block-level content) into nodes.
pub fn parse_blocks(source: &str, context: &Context) -> Result<Vec<Node>, LexError> {
    parse_blocks_at(source, 0, context)
}

/// Like [`parse_blocks`], for text that starts at `offset` in a larger source.
pub fn parse_blocks_at(source: &str, offset: usize, context: &Context) -> Result<Vec<Node>, LexError> {
    Parser::new(context).blocks(source, offset)
}

/// Parses inline content such as the text of a paragraph.
pub fn parse_inline(source: &str, context: &Context) -> Result<Vec<Node>, LexError> {
    parse_inline_at(source, 0, context)
}

fn parse_inline_at(source: &str, offset: usize, context: &Context) -> Result<Vec<Node>, LexError> {
    Parser::new(context).inline(source, offset)
}

/// Pins every reference in `nodes` to the definition `context` currently
/// sees for it, so it still resolves after a forked scope is dropped.
/// References with no visible definition are left for the renderer.
pub fn resolve_references(nodes: &mut [Node], context: &Context) {
    for node in nodes {
        match node {
            Node::ReferenceLink(reference) | Node::ReferenceImage(reference) => {
                if reference.definition.is_none() {
                    reference.definition = context.link_definition(&reference.reference);
                }
                resolve_references(&mut reference.label, context);
            }
            _ => {
                if let Some(children) = node.children_mut() {
                    resolve_references(children, context);
                }
            }
        }
    }
}

/// Maps tokens from any of the three grammars to nodes, registering link
/// definitions, function calls and math usage on `context` along the way.
pub fn parse(tokens: Vec<Token>, context: &Context) -> Result<Vec<Node>, LexError> {
    Parser::new(context).tokens(&tokens)
}

struct Parser<'c> {
    context: &'c Context,
    depth: usize,
}

impl<'c> Parser<'c> {
    fn new(context: &'c Context) -> Self {
        Parser { context, depth: 0 }
    }

    /// A parser one nesting level down, or `None` at the limit.
    fn nested(&self) -> Option<Parser<'c>> {
        (self.depth < MAX_NESTING_DEPTH).then(|| Parser {
            context: self.context,
            depth: self.depth + 1,
        })
    }

    fn tokens(&self, tokens: &[Token]) -> Result<Vec<Node>, LexError> {
        let mut nodes = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(node) = self.node(token)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// Block content one level down. Past the limit it stays one text block.
    fn blocks(&self, source: &str, offset: usize) -> Result<Vec<Node>, LexError> {
        let Some(parser) = self.nested() else {
            debug!("nesting limit reached at offset {offset}, keeping {} bytes as text", source.len());
            let text = source.trim().to_string();
            return Ok(vec![Node::BlockText {
                children: vec![Node::Text(text.clone())],
                text,
            }]);
        };
        let flavor = Arc::clone(self.context.flavor());
        let tokens = flavor.block_lexer(source, offset).tokenize()?;
        debug!("{} block tokens from {} bytes", tokens.len(), source.len());
        parser.tokens(&tokens)
    }

    /// Inline content one level down. Past the limit it stays one text node.
    fn inline(&self, source: &str, offset: usize) -> Result<Vec<Node>, LexError> {
        let Some(parser) = self.nested() else {
            debug!("nesting limit reached at offset {offset}, keeping {} bytes as text", source.len());
            return Ok(vec![Node::Text(source.to_string())]);
        };
        let flavor = Arc::clone(self.context.flavor());
        let tokens = flavor.inline_lexer(source, offset).tokenize()?;
        Ok(merge_text(parser.tokens(&tokens)?))
    }

    fn node(&self, token: &Token) -> Result<Option<Node>, LexError> {
        let start = token.span.start;
        let node = match token.kind {
            // -----------------------------------------------------------------
            // Block-level
            // -----------------------------------------------------------------
            TokenKind::BlockQuote => {
                let inner = strip_quote_markers(&token.text);
                Node::BlockQuote(self.blocks(&inner, start)?)
            }
            TokenKind::BlockCode => Node::Code {
                language: None,
                content: strip_code_indent(&token.text),
            },
            TokenKind::LinkDefinition => {
                let definition = LinkDefinition::new(
                    token.group_or_empty("label").trim(),
                    strip_angle_brackets(token.group_or_empty("url")),
                    token.group("title").map(strip_delimiters),
                );
                self.context.register_link_definition(definition.clone());
                Node::LinkDefinition(definition)
            }
            TokenKind::FencesCode => {
                let (lang, code) = match token.group("fence") {
                    Some(_) => (token.group_or_empty("lang"), token.group_or_empty("code")),
                    None => (token.group_or_empty("tilde_lang"), token.group_or_empty("tilde_code")),
                };
                let lang = lang.trim();
                Node::Code {
                    language: (!lang.is_empty()).then(|| lang.to_string()),
                    content: code.to_string(),
                }
            }
            TokenKind::MultilineMath | TokenKind::OnelineMath => {
                self.context.set_has_math();
                Node::Math(token.group_or_empty("expr").trim_end().to_string())
            }
            TokenKind::Heading => {
                let level = token.group_or_empty("level").len() as u8;
                let text = strip_closing_hashes(token.group_or_empty("text"));
                self.heading(level, text, start)?
            }
            TokenKind::SetextHeading => {
                let level = if token.group_or_empty("underline").starts_with('=') { 1 } else { 2 };
                let text = join_trimmed_lines(token.group_or_empty("text"));
                self.heading(level, &text, start)?
            }
            TokenKind::HorizontalRule => Node::HorizontalRule,
            TokenKind::Html => Node::Html(token.text.trim_end().to_string()),
            TokenKind::PageBreak => Node::PageBreak,
            TokenKind::FunctionCall => {
                let mut arguments = arguments::parse_arguments(token.group_or_empty("args"));
                let body = token.group_or_empty("body");
                if !body.trim().is_empty() {
                    arguments.push(FunctionCallArgument::body(dedent(body)));
                }
                self.call(token.group_or_empty("name"), arguments, token, true)
            }
            TokenKind::UnorderedList => self.list(token, false)?,
            TokenKind::OrderedList => self.list(token, true)?,
            TokenKind::Newline => return Ok(None),
            TokenKind::Paragraph => {
                let text = join_trimmed_lines(token.group_or_empty("text"));
                Node::Paragraph {
                    children: self.inline(&text, start)?,
                    text,
                }
            }
            TokenKind::BlockText => {
                let text = token.text.trim().to_string();
                if text.is_empty() {
                    return Ok(None);
                }
                Node::BlockText {
                    children: self.inline(&text, start)?,
                    text,
                }
            }

            // -----------------------------------------------------------------
            // List-level
            // -----------------------------------------------------------------
            TokenKind::ListItem => {
                let mut content = token.group_or_empty("text").to_string();
                content.push('\n');
                content.push_str(&dedent(token.group_or_empty("rest")));
                Node::ListItem(self.blocks(&content, start)?)
            }

            // -----------------------------------------------------------------
            // Inline
            // -----------------------------------------------------------------
            TokenKind::Escape => Node::Text(token.group_or_empty("char").to_string()),
            TokenKind::Comment => Node::Comment(token.text.clone()),
            TokenKind::LineBreak => Node::LineBreak,
            TokenKind::CodeSpan => {
                let code = token.group("double").or(token.group("single")).unwrap_or("");
                Node::CodeSpan(strip_code_span_padding(code).to_string())
            }
            TokenKind::MathSpan => {
                self.context.set_has_math();
                Node::MathSpan(token.group_or_empty("expr").to_string())
            }
            TokenKind::Image => Node::Image(self.link(token)?),
            TokenKind::ReferenceImage => Node::ReferenceImage(self.reference(token)?),
            TokenKind::Link => Node::Link(self.link(token)?),
            TokenKind::ReferenceLink => Node::ReferenceLink(self.reference(token)?),
            TokenKind::Autolink => {
                let url = token.group_or_empty("url").to_string();
                Node::Link(Link {
                    label: vec![Node::Text(url.clone())],
                    url,
                    title: None,
                })
            }
            TokenKind::InlineFunctionCall => {
                let arguments = arguments::parse_arguments(token.group_or_empty("args"));
                self.call(token.group_or_empty("name"), arguments, token, false)
            }
            TokenKind::StrongEmphasis => Node::StrongEmphasis(self.emphasized(token)?),
            TokenKind::Strong => Node::Strong(self.emphasized(token)?),
            TokenKind::Emphasis => Node::Emphasis(self.emphasized(token)?),
            TokenKind::Strikethrough => Node::Strikethrough(self.emphasized(token)?),
            TokenKind::CriticalContent => Node::CriticalContent(token.text.clone()),
            TokenKind::Whitespace => {
                // A soft line break keeps its newline.
                let text = if token.text.contains('\n') { "\n" } else { " " };
                Node::Text(text.to_string())
            }
            TokenKind::Text => Node::Text(token.text.clone()),
        };
        Ok(Some(node))
    }

    fn heading(&self, level: u8, text: &str, start: usize) -> Result<Node, LexError> {
        Ok(Node::Heading {
            level,
            children: self.inline(text, start)?,
            text: text.to_string(),
        })
    }

    fn call(&self, name: &str, arguments: Vec<FunctionCallArgument>, token: &Token, is_block: bool) -> Node {
        let call = Rc::new(FunctionCallNode::new(name, arguments, token.span.clone(), is_block));
        self.context.register_function_call(Rc::clone(&call));
        Node::FunctionCall(call)
    }

    fn list(&self, token: &Token, ordered: bool) -> Result<Node, LexError> {
        let flavor = Arc::clone(self.context.flavor());
        let tokens = flavor.list_lexer(&token.text, token.span.start).tokenize()?;

        let start = tokens
            .iter()
            .find(|t| t.kind == TokenKind::ListItem)
            .and_then(|t| t.group_or_empty("bullet").trim_end_matches(['.', ')']).parse().ok())
            .unwrap_or(1);
        let loose = is_loose(&tokens);

        Ok(Node::List {
            ordered,
            start,
            loose,
            items: self.tokens(&tokens)?,
        })
    }

    fn link(&self, token: &Token) -> Result<Link, LexError> {
        Ok(Link {
            label: self.inline(token.group_or_empty("label"), token.span.start)?,
            url: strip_angle_brackets(token.group_or_empty("url")),
            title: token.group("title").map(strip_delimiters),
        })
    }

    fn reference(&self, token: &Token) -> Result<ReferenceLink, LexError> {
        let label = token.group_or_empty("label");
        let reference = match token.group("reference") {
            Some(reference) if !reference.trim().is_empty() => reference,
            _ => label,
        };
        Ok(ReferenceLink {
            label: self.inline(label, token.span.start)?,
            reference: reference.to_string(),
            source: token.text.clone(),
            definition: None,
        })
    }

    fn emphasized(&self, token: &Token) -> Result<Vec<Node>, LexError> {
        let text = token.group("text").or(token.group("alt")).unwrap_or("");
        self.inline(text, token.span.start)
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// A list is loose when a blank line separates two items or two blocks
/// within an item.
fn is_loose(tokens: &[Token]) -> bool {
    let gap_between_items = tokens.iter().enumerate().any(|(i, t)| {
        t.kind == TokenKind::Newline && tokens[i + 1..].iter().any(|n| n.kind == TokenKind::ListItem)
    });
    let gap_inside_item = tokens.iter().filter(|t| t.kind == TokenKind::ListItem).any(|t| {
        let lines: Vec<&str> = t.group_or_empty("rest").lines().collect();
        lines
            .iter()
            .enumerate()
            .any(|(i, line)| line.trim().is_empty() && lines[i + 1..].iter().any(|l| !l.trim().is_empty()))
    });
    gap_between_items || gap_inside_item
}

fn strip_quote_markers(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.trim_start_matches(' ');
            let line = line.strip_prefix('>').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_code_indent(text: &str) -> String {
    let mut content: String = text
        .lines()
        .map(|line| {
            line.strip_prefix("    ")
                .or_else(|| line.strip_prefix('\t'))
                .unwrap_or(line.trim_start())
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string();
    content.push('\n');
    content
}

fn strip_closing_hashes(text: &str) -> &str {
    let trimmed = text.trim_end();
    let without = trimmed.trim_end_matches('#');
    if without.len() == trimmed.len() {
        trimmed
    } else if without.is_empty() || without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        trimmed
    }
}

fn join_trimmed_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

fn strip_angle_brackets(url: &str) -> String {
    let url = url.trim();
    url.strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url)
        .to_string()
}

/// Removes the quotes or parentheses around a link title.
fn strip_delimiters(title: &str) -> String {
    let mut chars = title.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

fn strip_code_span_padding(code: &str) -> &str {
    if code.len() >= 2 && code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty() {
        &code[1..code.len() - 1]
    } else {
        code
    }
}

/// Joins adjacent text nodes produced by the inline lexer.
fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(previous)), Node::Text(text)) = (merged.last_mut(), &node) {
            previous.push_str(text);
            continue;
        }
        merged.push(node);
    }
    merged
}
