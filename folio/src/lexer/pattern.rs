use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::lexer::token::TokenKind;

/// Upper bound on reference substitution passes, so that a reference whose
/// value mentions itself cannot loop forever.
const MAX_REFERENCE_PASSES: usize = 8;

#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    #[error("grammar '{0}' has no rules")]
    Empty(String),
    #[error("grammar '{0}' does not end with a universal fallback rule")]
    MissingFallback(String),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

// ---------------------------------------------------------------------------
// Pattern construction
// ---------------------------------------------------------------------------

/// Builds an anchored regex out of a template that may mention shared
/// fragments as `{{name}}`.
///
/// ```
/// use folio::lexer::pattern::PatternBuilder;
///
/// let regex = PatternBuilder::new(r"{{bullet}} item")
///     .reference("bullet", r"[*+-]")
///     .build()
///     .unwrap();
/// assert!(regex.is_match("- item"));
/// assert!(!regex.is_match("text - item"));
/// ```
pub struct PatternBuilder {
    template: String,
    references: Vec<(String, String)>,
}

impl PatternBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        PatternBuilder {
            template: template.into(),
            references: Vec::new(),
        }
    }

    pub fn reference(mut self, name: &str, value: impl Into<String>) -> Self {
        self.references.push((format!("{{{{{}}}}}", name), value.into()));
        self
    }

    /// Expands every reference and returns the raw pattern text.
    pub fn expand(&self) -> String {
        let mut pattern = self.template.clone();
        for _ in 0..MAX_REFERENCE_PASSES {
            let before = pattern.clone();
            for (placeholder, value) in &self.references {
                pattern = pattern.replace(placeholder, value);
            }
            if pattern == before {
                break;
            }
        }
        pattern
    }

    /// Compiles the pattern so that it only matches at the start of the input.
    pub fn build(&self) -> Result<Regex, GrammarError> {
        Ok(Regex::new(&format!(r"\A(?:{})", self.expand()))?)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// The outcome of a successful pattern match at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Number of bytes consumed.
    pub len: usize,
    pub groups: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// An anchored regex. When `guard` matches at the cursor the rule is skipped.
    Regex { regex: Regex, guard: Option<Regex> },
    /// One or more consecutive non-blank lines. The run stops before a blank
    /// line or before any line at which `interrupt` matches. The matched
    /// text is exposed as the `text` group.
    LineRun { interrupt: Regex },
    /// Always matches non-empty input.
    Fallback(Fallback),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The rest of the current line, or a lone newline.
    Line,
    /// A single character.
    Char,
}

impl Pattern {
    pub fn regex(builder: PatternBuilder) -> Result<Self, GrammarError> {
        Ok(Pattern::Regex {
            regex: builder.build()?,
            guard: None,
        })
    }

    pub fn guarded(builder: PatternBuilder, guard: PatternBuilder) -> Result<Self, GrammarError> {
        Ok(Pattern::Regex {
            regex: builder.build()?,
            guard: Some(guard.build()?),
        })
    }

    pub fn line_run(interrupt: PatternBuilder) -> Result<Self, GrammarError> {
        Ok(Pattern::LineRun {
            interrupt: interrupt.build()?,
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Pattern::Fallback(_))
    }

    /// Tries to match at the start of `input`. Empty matches are rejected.
    pub fn match_at(&self, input: &str) -> Option<Match> {
        if input.is_empty() {
            return None;
        }
        let m = match self {
            Pattern::Regex { regex, guard } => {
                if guard.as_ref().is_some_and(|g| g.is_match(input)) {
                    return None;
                }
                let caps = regex.captures(input)?;
                let whole = caps.get(0)?;
                let groups = regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                    .collect();
                Match {
                    len: whole.end(),
                    groups,
                }
            }
            Pattern::LineRun { interrupt } => {
                let len = line_run_len(input, interrupt);
                let mut groups = HashMap::new();
                groups.insert("text".to_string(), input[..len].to_string());
                Match { len, groups }
            }
            Pattern::Fallback(kind) => {
                let len = match kind {
                    Fallback::Line => match input.find('\n') {
                        Some(0) => 1,
                        Some(end) => end,
                        None => input.len(),
                    },
                    Fallback::Char => input.chars().next().map_or(0, char::len_utf8),
                };
                Match {
                    len,
                    groups: HashMap::new(),
                }
            }
        };
        (m.len > 0).then_some(m)
    }
}

fn line_run_len(input: &str, interrupt: &Regex) -> usize {
    let mut end = 0;
    let mut line_start = 0;
    while line_start < input.len() {
        let rest = &input[line_start..];
        let line = rest.split('\n').next().unwrap_or("");
        if line.trim().is_empty() {
            break;
        }
        // The first line always belongs to the run.
        if line_start > 0 && interrupt.is_match(rest) {
            break;
        }
        end = line_start + line.len();
        line_start = end + 1;
    }
    end
}

// ---------------------------------------------------------------------------
// Grammars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: TokenKind,
    pub pattern: Pattern,
}

impl Rule {
    pub fn new(kind: TokenKind, pattern: Pattern) -> Self {
        Rule { kind, pattern }
    }

    pub fn fallback(kind: TokenKind, fallback: Fallback) -> Self {
        Rule {
            kind,
            pattern: Pattern::Fallback(fallback),
        }
    }
}

/// An ordered rule list. Earlier rules take priority over later ones.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    rules: Vec<Rule>,
}

impl Grammar {
    /// Fails if `rules` is empty or does not end with a fallback rule.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, GrammarError> {
        let name = name.into();
        match rules.last() {
            None => Err(GrammarError::Empty(name)),
            Some(last) if !last.pattern.is_fallback() => Err(GrammarError::MissingFallback(name)),
            Some(_) => Ok(Grammar { name, rules }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_expand_recursively() {
        let builder = PatternBuilder::new("a{{outer}}")
            .reference("outer", "b{{inner}}")
            .reference("inner", "c");
        assert_eq!(builder.expand(), "abc");
    }

    #[test]
    fn built_patterns_are_anchored() {
        let regex = PatternBuilder::new("b").build().unwrap();
        assert!(regex.is_match("bc"));
        assert!(!regex.is_match("ab"));
    }

    #[test]
    fn guard_vetoes_a_match() {
        let pattern = Pattern::guarded(PatternBuilder::new(r"[^\n]+"), PatternBuilder::new("-")).unwrap();
        assert!(pattern.match_at("text").is_some());
        assert!(pattern.match_at("- item").is_none());
    }

    #[test]
    fn line_run_stops_at_blank_line_and_interrupt() {
        let pattern = Pattern::line_run(PatternBuilder::new("#")).unwrap();
        let m = pattern.match_at("one\ntwo\n\nthree").unwrap();
        assert_eq!(m.len, 7);
        let m = pattern.match_at("one\n# two").unwrap();
        assert_eq!(m.groups["text"], "one");
    }

    #[test]
    fn fallbacks_always_consume() {
        let line = Pattern::Fallback(Fallback::Line);
        assert_eq!(line.match_at("ab\ncd").unwrap().len, 2);
        assert_eq!(line.match_at("\ncd").unwrap().len, 1);
        let ch = Pattern::Fallback(Fallback::Char);
        assert_eq!(ch.match_at("é!").unwrap().len, 2);
    }

    #[test]
    fn grammar_requires_trailing_fallback() {
        let rule = Rule::new(TokenKind::Text, Pattern::regex(PatternBuilder::new("a")).unwrap());
        assert!(matches!(
            Grammar::new("broken", vec![rule]),
            Err(GrammarError::MissingFallback(_))
        ));
        assert!(matches!(Grammar::new("empty", vec![]), Err(GrammarError::Empty(_))));

        let ok = Grammar::new("ok", vec![Rule::fallback(TokenKind::Text, Fallback::Char)]);
        assert!(ok.is_ok());
    }
}
