//! Flavors: the named grammar sets that select a dialect of the language.

mod patterns;

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::lexer::{Grammar, GrammarError, Lexer, Rule};

/// A dialect: one ordered grammar per lexer entry point.
#[derive(Debug)]
pub struct Flavor {
    name: String,
    block: Grammar,
    list: Grammar,
    inline: Grammar,
}

static BASE: Lazy<Result<Arc<Flavor>, GrammarError>> = Lazy::new(|| build_base().map(Arc::new));

static EXTENDED: Lazy<Result<Arc<Flavor>, GrammarError>> = Lazy::new(|| build_extended().map(Arc::new));

impl Flavor {
    pub fn new(name: impl Into<String>, block: Grammar, list: Grammar, inline: Grammar) -> Self {
        Flavor {
            name: name.into(),
            block,
            list,
            inline,
        }
    }

    /// Plain Markdown-like grammar without functions, math or page breaks.
    pub fn base() -> Result<Arc<Flavor>, GrammarError> {
        shared(&BASE)
    }

    /// The full dialect: base grammar plus function calls, math and page breaks.
    pub fn extended() -> Result<Arc<Flavor>, GrammarError> {
        shared(&EXTENDED)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_grammar(&self) -> &Grammar {
        &self.block
    }

    pub fn list_grammar(&self) -> &Grammar {
        &self.list
    }

    pub fn inline_grammar(&self) -> &Grammar {
        &self.inline
    }

    pub fn block_lexer<'a>(&'a self, source: &'a str, offset: usize) -> Lexer<'a> {
        Lexer::with_offset(source, &self.block, offset)
    }

    pub fn list_lexer<'a>(&'a self, source: &'a str, offset: usize) -> Lexer<'a> {
        Lexer::with_offset(source, &self.list, offset)
    }

    pub fn inline_lexer<'a>(&'a self, source: &'a str, offset: usize) -> Lexer<'a> {
        Lexer::with_offset(source, &self.inline, offset)
    }
}

/// Returns the cached flavor, or a copy of the cached construction error.
fn shared(cell: &Lazy<Result<Arc<Flavor>, GrammarError>>) -> Result<Arc<Flavor>, GrammarError> {
    Lazy::force(cell).as_ref().map(Arc::clone).map_err(GrammarError::clone)
}

fn build_base() -> Result<Flavor, GrammarError> {
    use patterns::*;

    let block = vec![
        block_quote()?,
        block_code()?,
        link_definition()?,
        fences_code()?,
        heading()?,
        horizontal_rule()?,
        setext_heading()?,
        html()?,
        unordered_list()?,
        ordered_list()?,
        newline()?,
        paragraph(&[])?,
        block_text(),
    ];
    let inline = vec![
        escape()?,
        comment()?,
        line_break()?,
        code_span()?,
        image()?,
        reference_image()?,
        link()?,
        reference_link()?,
        autolink()?,
        strong_emphasis()?,
        strong()?,
        emphasis()?,
        strikethrough()?,
        critical_content()?,
        whitespace()?,
        text()?,
        inline_fallback(),
    ];
    Ok(Flavor::new(
        "base",
        Grammar::new("base-block", block)?,
        list_grammar("base-list")?,
        Grammar::new("base-inline", inline)?,
    ))
}

fn build_extended() -> Result<Flavor, GrammarError> {
    use patterns::*;

    let block = vec![
        block_quote()?,
        block_code()?,
        link_definition()?,
        fences_code()?,
        multiline_math()?,
        oneline_math()?,
        heading()?,
        horizontal_rule()?,
        setext_heading()?,
        html()?,
        page_break()?,
        function_call()?,
        unordered_list()?,
        ordered_list()?,
        newline()?,
        paragraph(EXTENDED_PARAGRAPH_INTERRUPTS)?,
        block_text(),
    ];
    let inline = vec![
        escape()?,
        comment()?,
        line_break()?,
        code_span()?,
        math_span()?,
        image()?,
        reference_image()?,
        link()?,
        reference_link()?,
        autolink()?,
        inline_function_call()?,
        strong_emphasis()?,
        strong()?,
        emphasis()?,
        strikethrough()?,
        critical_content()?,
        whitespace()?,
        text()?,
        inline_fallback(),
    ];
    Ok(Flavor::new(
        "extended",
        Grammar::new("extended-block", block)?,
        list_grammar("extended-list")?,
        Grammar::new("extended-inline", inline)?,
    ))
}

fn list_grammar(name: &str) -> Result<Grammar, GrammarError> {
    let rules: Vec<Rule> = vec![patterns::list_item()?, patterns::newline()?, patterns::block_text()];
    Grammar::new(name, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    fn kinds(tokens: Vec<crate::lexer::Token>) -> Vec<TokenKind> {
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn flavors_are_cached() {
        let a = Flavor::extended().unwrap();
        let b = Flavor::extended().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "extended");
    }

    #[test]
    fn construction_errors_are_built_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        static BROKEN: Lazy<Result<Arc<Flavor>, GrammarError>> = Lazy::new(|| {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Err(GrammarError::Empty("broken".into()))
        });

        for _ in 0..3 {
            assert!(matches!(shared(&BROKEN), Err(GrammarError::Empty(name)) if name == "broken"));
        }
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_grammar_ends_with_a_fallback() {
        for flavor in [Flavor::base().unwrap(), Flavor::extended().unwrap()] {
            for grammar in [flavor.block_grammar(), flavor.list_grammar(), flavor.inline_grammar()] {
                assert!(grammar.rules().last().unwrap().pattern.is_fallback(), "{}", grammar.name());
            }
        }
    }

    #[test]
    fn base_flavor_has_no_function_calls() {
        let flavor = Flavor::base().unwrap();
        let tokens = flavor.block_lexer(".name {x}\n", 0).tokenize().unwrap();
        assert_eq!(kinds(tokens), vec![TokenKind::Paragraph, TokenKind::Newline]);
    }

    #[test]
    fn function_call_with_body() {
        let flavor = Flavor::extended().unwrap();
        let tokens = flavor
            .block_lexer(".box {Title} kind:{note}\n  body line\n\n  more\nafter\n", 0)
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FunctionCall);
        assert_eq!(tokens[0].group("name"), Some("box"));
        assert_eq!(tokens[0].group("args"), Some(" {Title} kind:{note}"));
        assert_eq!(tokens[0].group("body"), Some("  body line\n\n  more\n"));
        assert_eq!(tokens[1].kind, TokenKind::Paragraph);
    }

    #[test]
    fn list_item_grammar_splits_items() {
        let flavor = Flavor::extended().unwrap();
        let tokens = flavor.list_lexer("- one\n  cont\n- two\n", 0).tokenize().unwrap();
        let items: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::ListItem).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].group("text"), Some("one"));
        assert_eq!(items[0].group("rest"), Some("  cont\n"));
        assert_eq!(items[1].group("bullet"), Some("-"));
    }
}
