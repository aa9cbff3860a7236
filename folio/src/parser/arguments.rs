use once_cell::sync::Lazy;
use regex::Regex;

use crate::function::FunctionCallArgument;

/// One `{value}` or `name:{value}` argument, with one level of nested braces.
static ARGUMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?P<name>[A-Za-z_][A-Za-z0-9_]*):)?\{(?P<value>(?:[^{}\n]|\{[^{}\n]*\})*)\}").unwrap()
});

/// Splits the argument list of a call site, as captured by the lexer.
pub(crate) fn parse_arguments(source: &str) -> Vec<FunctionCallArgument> {
    ARGUMENT_REGEX
        .captures_iter(source)
        .map(|caps| {
            let value = caps.name("value").map_or("", |m| m.as_str());
            match caps.name("name") {
                Some(name) => FunctionCallArgument::named(name.as_str(), value),
                None => FunctionCallArgument::raw(value),
            }
        })
        .collect()
}

/// Removes the smallest common indentation from every non-blank line.
pub(crate) fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|line| if line.trim().is_empty() { "" } else { &line[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}
