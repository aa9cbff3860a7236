//! Ordered, first-match-wins tokenization.
//!
//! A [`Lexer`] scans its input with a [`Grammar`]: at every cursor position
//! the rules are tried in declared order and the first one that matches
//! produces the next token. Rule order is therefore the priority order.

pub mod pattern;
pub mod token;

use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use log::trace;
use thiserror::Error;

pub use pattern::{Fallback, Grammar, GrammarError, Pattern, PatternBuilder, Rule};
pub use token::{Token, TokenKind};

/// Fatal lexer failures. These indicate a defective grammar, not bad input.
#[derive(Debug, Clone, Error)]
pub enum LexError {
    #[error("lexer stalled at offset {offset}: no rule of grammar '{grammar}' matches {excerpt:?}")]
    Stalled {
        grammar: String,
        offset: usize,
        excerpt: String,
    },
}

impl LexError {
    pub fn span(&self) -> Range<usize> {
        match self {
            LexError::Stalled { offset, excerpt, .. } => *offset..*offset + excerpt.len(),
        }
    }

    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::bug()
            .with_message(self.to_string())
            .with_labels(vec![Label::primary(file_id, self.span())])
    }
}

/// A single-use scan over one input. Iterating it consumes it; re-scanning
/// requires a fresh lexer.
pub struct Lexer<'a> {
    source: &'a str,
    grammar: &'a Grammar,
    cursor: usize,
    /// Added to every emitted span, for lexers run over a slice of a larger document.
    offset: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, grammar: &'a Grammar) -> Self {
        Self::with_offset(source, grammar, 0)
    }

    pub fn with_offset(source: &'a str, grammar: &'a Grammar, offset: usize) -> Self {
        Lexer {
            source,
            grammar,
            cursor: 0,
            offset,
            failed: false,
        }
    }

    /// Scans the whole input.
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.source.len() {
            return None;
        }
        let rest = &self.source[self.cursor..];

        for rule in self.grammar.rules() {
            if let Some(m) = rule.pattern.match_at(rest) {
                let start = self.cursor;
                self.cursor += m.len;
                trace!("{}: {} at {}..{}", self.grammar.name(), rule.kind, start, self.cursor);
                return Some(Ok(Token {
                    kind: rule.kind,
                    text: rest[..m.len].to_string(),
                    groups: m.groups,
                    span: self.offset + start..self.offset + self.cursor,
                }));
            }
        }

        self.failed = true;
        Some(Err(LexError::Stalled {
            grammar: self.grammar.name().to_string(),
            offset: self.offset + self.cursor,
            excerpt: rest.chars().take(16).collect(),
        }))
    }
}
