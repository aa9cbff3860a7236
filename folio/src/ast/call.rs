use std::cell::OnceCell;
use std::ops::Range;

use crate::ast::Node;
use crate::function::{ArgumentValue, FunctionCallArgument};

/// An embedded function call.
///
/// The node is shared between the tree and the context's pending-call queue.
/// Its children start out empty and are filled exactly once by expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallNode {
    pub name: String,
    pub arguments: Vec<FunctionCallArgument>,
    /// Byte span of the call in the source it was parsed from.
    pub span: Range<usize>,
    /// Whether the call stands as a block of its own or sits inside text.
    pub is_block: bool,
    children: OnceCell<Vec<Node>>,
}

impl FunctionCallNode {
    pub fn new(
        name: impl Into<String>,
        arguments: Vec<FunctionCallArgument>,
        span: Range<usize>,
        is_block: bool,
    ) -> Self {
        FunctionCallNode {
            name: name.into(),
            arguments,
            span,
            is_block,
            children: OnceCell::new(),
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.children.get().is_some()
    }

    /// Expanded content. Empty until the call has been expanded.
    pub fn children(&self) -> &[Node] {
        self.children.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stores the expansion result. Returns the rejected nodes if the call
    /// was already expanded; existing children are never replaced.
    pub fn set_children(&self, children: Vec<Node>) -> Result<(), Vec<Node>> {
        self.children.set(children)
    }

    /// A compact rendering of the call used in diagnostics, e.g. `sum(2, a)`.
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|arg| {
                let value = match &arg.value {
                    ArgumentValue::Raw(raw) => first_line(raw),
                    ArgumentValue::Typed(value) => value.to_string(),
                };
                match &arg.name {
                    Some(name) => format!("{}: {}", name, value),
                    None if arg.is_body => "<body>".to_string(),
                    None => value,
                }
            })
            .collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

fn first_line(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once('\n') {
        Some((line, _)) => format!("{}...", line.trim_end()),
        None => trimmed.to_string(),
    }
}
