use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Every kind of token any of the three grammars can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Block-level
    BlockQuote,
    BlockCode,
    LinkDefinition,
    FencesCode,
    MultilineMath,
    OnelineMath,
    Heading,
    HorizontalRule,
    SetextHeading,
    Html,
    PageBreak,
    FunctionCall,
    UnorderedList,
    OrderedList,
    Newline,
    Paragraph,
    BlockText,

    // List-level
    ListItem,

    // Inline
    Escape,
    Comment,
    LineBreak,
    CodeSpan,
    MathSpan,
    Image,
    ReferenceImage,
    Link,
    ReferenceLink,
    Autolink,
    InlineFunctionCall,
    StrongEmphasis,
    Strong,
    Emphasis,
    Strikethrough,
    CriticalContent,
    Whitespace,
    Text,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A classified, positioned span of source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The whole matched text.
    pub text: String,
    /// Named capture groups that participated in the match.
    pub groups: HashMap<String, String>,
    /// Byte range in the source this token was lexed from.
    pub span: Range<usize>,
}

impl Token {
    /// The text of a named group, if it participated in the match.
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(|s| s.as_str())
    }

    /// The text of a named group, or an empty string.
    pub fn group_or_empty(&self, name: &str) -> &str {
        self.group(name).unwrap_or("")
    }
}
