//! Pattern sources for the built-in grammars.
//!
//! Shared fragments are spliced in through [`PatternBuilder`] references so
//! that complex pieces such as the bullet marker or the HTML tag list are
//! written once.

use crate::lexer::{Fallback, GrammarError, Pattern, PatternBuilder, Rule, TokenKind};

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

const BULLET: &str = r"[*+-]|\d{1,9}[.)]";

const HORIZONTAL_RULE: &str = r" {0,3}(?:(?:-[\t ]*){3,}|(?:_[ \t]*){3,}|(?:\*[ \t]*){3,})(?:\n+|\z)";

const BLOCK_LABEL: &str = r"(?:\\.|[^\[\]\\\s])(?:\\.|[^\[\]\\])*";

const BLOCK_TITLE: &str = r#"(?:"(?:\\"?|[^"\\])*"|'[^'\n]*(?:\n[^'\n]+)*\n?'|\([^()]*\))"#;

const TAG: &str = "address|article|aside|base|basefont|blockquote|body|caption\
    |center|col|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption\
    |figure|footer|form|frame|frameset|h[1-6]|head|header|hr|html|iframe\
    |legend|li|link|main|menu|menuitem|meta|nav|noframes|ol|optgroup|option\
    |p|param|search|section|summary|table|tbody|td|tfoot|th|thead|title\
    |tr|track|ul";

const COMMENT: &str = r"<!--(?:-?>|(?s:.*?)-->)";

const ATTRIBUTE: &str = r#" +[a-zA-Z:_][\w.:-]*(?: *= *"[^"\n]*"| *= *'[^'\n]*'| *= *[^\s"'=<>`]+)?"#;

const IDENTIFIER: &str = r"[A-Za-z_][A-Za-z0-9_]*";

/// `{value}` or `name:{value}`, allowing one level of nested braces.
const ARGUMENT: &str = r"(?:[A-Za-z_][A-Za-z0-9_]*:)?\{(?:[^{}\n]|\{[^{}\n]*\})*\}";

/// Lines indented by at least two spaces or a tab, optionally separated by blank lines.
const INDENTED_LINES: &str = r"(?:(?:[ \t]*\n)*(?: {2,}|\t)[^\n]*(?:\n|\z))*";

const INLINE_LABEL: &str = r"(?:\\.|[^\[\]\\]|\[(?:\\.|[^\[\]\\])*\])*";

const INLINE_URL: &str = r"<[^<>\n]*>|[^\s()<>]*(?:\([^\s()]*\)[^\s()<>]*)*";

const INLINE_TITLE: &str = r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])*'|\((?:\\.|[^()\\])*\)"#;

/// Characters that may start an inline construct and therefore end a text run.
const INLINE_DELIMITERS: &str = r"\\*_`~\[\]!<>&$.";

// ---------------------------------------------------------------------------
// Block rules
// ---------------------------------------------------------------------------

pub fn block_quote() -> Result<Rule, GrammarError> {
    Ok(Rule::new(
        TokenKind::BlockQuote,
        Pattern::regex(PatternBuilder::new(r"(?: {0,3}>[^\n]*(?:\n|\z))+"))?,
    ))
}

pub fn block_code() -> Result<Rule, GrammarError> {
    Ok(Rule::new(
        TokenKind::BlockCode,
        Pattern::regex(PatternBuilder::new(r"(?:(?: {4}|\t)[^\n]+(?:\n(?:[ \t]*(?:\n|\z))*)?)+"))?,
    ))
}

pub fn link_definition() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r" {0,3}\[(?P<label>{{label}})\]: *(?:\n *)?(?P<url>[^<\s][^\s]*|<[^>\n]*>)(?:(?: +(?:\n *)?| *\n *)(?P<title>{{title}}))? *(?:\n+|\z)",
    )
    .reference("label", BLOCK_LABEL)
    .reference("title", BLOCK_TITLE);
    Ok(Rule::new(TokenKind::LinkDefinition, Pattern::regex(builder)?))
}

pub fn fences_code() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r" {0,3}(?:(?P<fence>`{3,})(?P<lang>[^\n`]*)\n(?P<code>(?s:.*?\n)??) {0,3}`{3,}[ \t]*(?:\n|\z)|(?P<tilde_fence>~{3,})(?P<tilde_lang>[^\n]*)\n(?P<tilde_code>(?s:.*?\n)??) {0,3}~{3,}[ \t]*(?:\n|\z))",
    );
    Ok(Rule::new(TokenKind::FencesCode, Pattern::regex(builder)?))
}

pub fn multiline_math() -> Result<Rule, GrammarError> {
    let builder =
        PatternBuilder::new(r" {0,3}\$\$\$[ \t]*\n(?P<expr>(?s:.*?\n)??) {0,3}\$\$\$[ \t]*(?:\n|\z)");
    Ok(Rule::new(TokenKind::MultilineMath, Pattern::regex(builder)?))
}

pub fn oneline_math() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(r" {0,3}\$[ \t]+(?P<expr>[^\n]+?)[ \t]+\$[ \t]*(?:\n+|\z)");
    Ok(Rule::new(TokenKind::OnelineMath, Pattern::regex(builder)?))
}

pub fn heading() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(r" {0,3}(?P<level>#{1,6})(?:[ \t]+(?P<text>[^\n]*?))?[ \t]*(?:\n+|\z)");
    Ok(Rule::new(TokenKind::Heading, Pattern::regex(builder)?))
}

pub fn horizontal_rule() -> Result<Rule, GrammarError> {
    Ok(Rule::new(
        TokenKind::HorizontalRule,
        Pattern::regex(PatternBuilder::new(HORIZONTAL_RULE))?,
    ))
}

pub fn setext_heading() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r"(?P<text>[^\n]+(?:\n[^\n]+)*?)\n {0,3}(?P<underline>=+|-+)[ \t]*(?:\n+|\z)",
    );
    let guard = PatternBuilder::new(r" {0,3}(?:{{bullet}})[ \t]").reference("bullet", BULLET);
    Ok(Rule::new(TokenKind::SetextHeading, Pattern::guarded(builder, guard)?))
}

pub fn html() -> Result<Rule, GrammarError> {
    let raw_block = |tag: &str| format!(r"<{tag}[\s>](?s:.*?)</{tag}>[^\n]*(?:\n+|\z)");
    let template = format!(
        r" {{0,3}}(?:{}|{}|{}|{}|{{{{comment}}}}[^\n]*(?:\n+|\z)|<\?(?s:.*?)\?>\n*|<![A-Z](?s:.*?)>\n*|<!\[CDATA\[(?s:.*?)\]\]>\n*|</?(?:{{{{tag}}}})(?: +|\n|/?>)(?s:.*?)(?:\n[ \t]*\n|\z)|<[a-z][\w-]*(?:{{{{attribute}}}})* */?>[ \t]*\n(?s:.*?)(?:\n[ \t]*\n|\z)|</[a-z][\w-]*\s*>[ \t]*\n(?s:.*?)(?:\n[ \t]*\n|\z))",
        raw_block("script"),
        raw_block("pre"),
        raw_block("style"),
        raw_block("textarea"),
    );
    let builder = PatternBuilder::new(template)
        .reference("comment", COMMENT)
        .reference("tag", TAG)
        .reference("attribute", ATTRIBUTE);
    Ok(Rule::new(TokenKind::Html, Pattern::regex(builder)?))
}

pub fn page_break() -> Result<Rule, GrammarError> {
    Ok(Rule::new(
        TokenKind::PageBreak,
        Pattern::regex(PatternBuilder::new(r" {0,3}<<<[ \t]*(?:\n+|\z)"))?,
    ))
}

pub fn function_call() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r" {0,3}\.(?P<name>{{identifier}})(?P<args>(?:[ \t]*{{argument}})*)[ \t]*(?:\n|\z)(?P<body>{{indented}})",
    )
    .reference("identifier", IDENTIFIER)
    .reference("argument", ARGUMENT)
    .reference("indented", INDENTED_LINES);
    Ok(Rule::new(TokenKind::FunctionCall, Pattern::regex(builder)?))
}

fn list(kind: TokenKind, marker: &str) -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r" {0,3}(?:{{marker}})(?:[ \t][^\n]*)?(?:\n|\z)(?:(?:[ \t]*\n)*(?: {0,3}(?:{{marker}})(?:[ \t][^\n]*)?|(?: {2,}|\t)[^\n]*)(?:\n|\z))*",
    )
    .reference("marker", marker);
    Ok(Rule::new(kind, Pattern::regex(builder)?))
}

pub fn unordered_list() -> Result<Rule, GrammarError> {
    list(TokenKind::UnorderedList, r"[*+-]")
}

pub fn ordered_list() -> Result<Rule, GrammarError> {
    list(TokenKind::OrderedList, r"\d{1,9}[.)]")
}

pub fn newline() -> Result<Rule, GrammarError> {
    Ok(Rule::new(
        TokenKind::Newline,
        Pattern::regex(PatternBuilder::new(r"(?:[ \t]*(?:\n|\z))+"))?,
    ))
}

/// A paragraph runs until a line that would start another block.
/// `extra_interrupts` lets a flavor add its own block starters.
pub fn paragraph(extra_interrupts: &[&str]) -> Result<Rule, GrammarError> {
    let mut interrupts = vec![
        "{{hr}}",
        r" {0,3}#{1,6}(?:[ \t]|\n|\z)",
        r" {0,3}(?:`{3,}|~{3,})",
        r" {0,3}(?:[*+-]|1[.)])[ \t]",
        r"</?(?:{{tag}})(?: +|\n|/?>)",
        r"<(?:script|pre|style|textarea|!--)",
        r" {0,3}>",
    ];
    interrupts.extend_from_slice(extra_interrupts);
    let builder = PatternBuilder::new(interrupts.join("|"))
        .reference("hr", HORIZONTAL_RULE)
        .reference("tag", TAG)
        .reference("identifier", IDENTIFIER)
        .reference("argument", ARGUMENT);
    Ok(Rule::new(TokenKind::Paragraph, Pattern::line_run(builder)?))
}

pub fn block_text() -> Rule {
    Rule::fallback(TokenKind::BlockText, Fallback::Line)
}

/// Paragraph interrupts contributed by the extended block rules.
pub const EXTENDED_PARAGRAPH_INTERRUPTS: &[&str] = &[
    r" {0,3}\$\$\$",
    r" {0,3}<<<",
    r" {0,3}\.{{identifier}}(?:[ \t]*{{argument}})*[ \t]*(?:\n|\z)",
];

// ---------------------------------------------------------------------------
// List item rules
// ---------------------------------------------------------------------------

pub fn list_item() -> Result<Rule, GrammarError> {
    let builder = PatternBuilder::new(
        r" {0,3}(?P<bullet>{{bullet}})(?:[ \t](?P<text>[^\n]*))?(?:\n|\z)(?P<rest>{{indented}})",
    )
    .reference("bullet", BULLET)
    .reference("indented", INDENTED_LINES);
    Ok(Rule::new(TokenKind::ListItem, Pattern::regex(builder)?))
}

// ---------------------------------------------------------------------------
// Inline rules
// ---------------------------------------------------------------------------

fn inline(kind: TokenKind, builder: PatternBuilder) -> Result<Rule, GrammarError> {
    Ok(Rule::new(kind, Pattern::regex(builder)?))
}

pub fn escape() -> Result<Rule, GrammarError> {
    inline(TokenKind::Escape, PatternBuilder::new(r"\\(?P<char>[!-/:-@\[-`{-~])"))
}

pub fn comment() -> Result<Rule, GrammarError> {
    inline(TokenKind::Comment, PatternBuilder::new(COMMENT))
}

pub fn line_break() -> Result<Rule, GrammarError> {
    inline(TokenKind::LineBreak, PatternBuilder::new(r"(?: {2,}|\\)\n"))
}

pub fn code_span() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::CodeSpan,
        PatternBuilder::new(r"``(?P<double>(?s:.+?))``|`(?P<single>[^`]+)`"),
    )
}

pub fn math_span() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::MathSpan,
        PatternBuilder::new(r"\$(?P<expr>[^\s$](?:[^$\n]*[^\s$])?)\$"),
    )
}

fn link_target(template: &str) -> PatternBuilder {
    PatternBuilder::new(template)
        .reference("label", INLINE_LABEL)
        .reference("url", INLINE_URL)
        .reference("title", INLINE_TITLE)
}

const LINK: &str = r"\[(?P<label>{{label}})\]\(\s*(?P<url>{{url}})(?:\s+(?P<title>{{title}}))?\s*\)";
const REFERENCE: &str = r"\[(?P<label>{{label}})\](?:\[(?P<reference>[^\[\]]*)\])?";

pub fn image() -> Result<Rule, GrammarError> {
    inline(TokenKind::Image, link_target(&format!("!{LINK}")))
}

pub fn reference_image() -> Result<Rule, GrammarError> {
    inline(TokenKind::ReferenceImage, link_target(&format!("!{REFERENCE}")))
}

pub fn link() -> Result<Rule, GrammarError> {
    inline(TokenKind::Link, link_target(LINK))
}

pub fn reference_link() -> Result<Rule, GrammarError> {
    inline(TokenKind::ReferenceLink, link_target(REFERENCE))
}

pub fn autolink() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Autolink,
        PatternBuilder::new(r"<(?P<url>[A-Za-z][A-Za-z0-9+.-]{1,31}:[^\s<>]*)>"),
    )
}

pub fn inline_function_call() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::InlineFunctionCall,
        PatternBuilder::new(r"\.(?P<name>{{identifier}})(?P<args>(?:[ \t]*{{argument}})*)")
            .reference("identifier", IDENTIFIER)
            .reference("argument", ARGUMENT),
    )
}

pub fn strong_emphasis() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::StrongEmphasis,
        PatternBuilder::new(r"\*\*\*(?P<text>[^\s*](?s:.*?))\*\*\*|___(?P<alt>[^\s_](?s:.*?))___"),
    )
}

pub fn strong() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Strong,
        PatternBuilder::new(r"\*\*(?P<text>[^\s*](?s:.*?))\*\*|__(?P<alt>[^\s_](?s:.*?))__"),
    )
}

pub fn emphasis() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Emphasis,
        PatternBuilder::new(r"\*(?P<text>[^\s*](?s:.*?))\*|_(?P<alt>[^\s_](?s:.*?))_"),
    )
}

pub fn strikethrough() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Strikethrough,
        PatternBuilder::new(r"~~(?P<text>[^\s~](?s:.*?))~~"),
    )
}

pub fn critical_content() -> Result<Rule, GrammarError> {
    inline(TokenKind::CriticalContent, PatternBuilder::new(r"[&<>]"))
}

pub fn whitespace() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Whitespace,
        PatternBuilder::new(r"[ \t]*\n[ \t]*|[ \t]+"),
    )
}

/// A run of ordinary characters. Dots and underscores inside a word do not
/// end it, so `file.txt` or `snake_case` stay plain text.
pub fn text() -> Result<Rule, GrammarError> {
    inline(
        TokenKind::Text,
        PatternBuilder::new(r"[^\s{{delimiters}}]+(?:[._]+[^\s{{delimiters}}]+)*\.*")
            .reference("delimiters", INLINE_DELIMITERS),
    )
}

pub fn inline_fallback() -> Rule {
    Rule::fallback(TokenKind::Text, Fallback::Char)
}
