use std::fmt;
use std::rc::Rc;

use crate::ast::Node;
use crate::context::Context;

/// A named, closed set of members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumKind {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumKind {
    pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self {
        EnumKind { name, members }
    }

    /// Exact member name first, then a case-insensitive match.
    pub fn member(&self, name: &str) -> Option<&'static str> {
        self.members
            .iter()
            .find(|m| **m == name)
            .or_else(|| self.members.iter().find(|m| m.eq_ignore_ascii_case(name)))
            .copied()
    }
}

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    /// Markdown source, parsed into nodes during coercion.
    Markdown,
    Enum(EnumKind),
    /// The calling context. Only valid for injected parameters.
    Context,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => write!(f, "number"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Markdown => write!(f, "markdown"),
            ValueKind::Enum(kind) => write!(f, "{}", kind.name),
            ValueKind::Context => write!(f, "context"),
        }
    }
}

/// A typed argument value, ready to be handed to a function body.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Markdown(Vec<Node>),
    Enum(&'static str),
    Context(Rc<Context>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Markdown(_) => "markdown",
            Value::Enum(_) => "enum",
            Value::Context(_) => "context",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Markdown(nodes) => {
                for node in nodes {
                    write!(f, "{}", node.plain_text())?;
                }
                Ok(())
            }
            Value::Enum(member) => write!(f, "{}", member),
            Value::Context(_) => write!(f, "<context>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Markdown(a), Value::Markdown(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Context(a), Value::Context(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// What a function body returns.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// A single node, such as a layout container.
    Node(Node),
    /// A node sequence, typically parsed markdown content.
    Markdown(Vec<Node>),
    Void,
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Number(n) => fmt_number(*n, f),
            OutputValue::String(s) => write!(f, "{}", s),
            OutputValue::Boolean(b) => write!(f, "{}", b),
            OutputValue::Node(node) => write!(f, "{}", node.plain_text()),
            OutputValue::Markdown(nodes) => {
                for node in nodes {
                    write!(f, "{}", node.plain_text())?;
                }
                Ok(())
            }
            OutputValue::Void => Ok(()),
        }
    }
}

/// Integral values print without a fractional part.
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n == n.floor() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: EnumKind = EnumKind::new("Size", &["Small", "Large"]);

    #[test]
    fn enum_member_lookup() {
        assert_eq!(SIZE.member("Small"), Some("Small"));
        assert_eq!(SIZE.member("large"), Some("Large"));
        assert_eq!(SIZE.member("huge"), None);
    }

    #[test]
    fn numbers_print_integrally() {
        assert_eq!(OutputValue::Number(5.0).to_string(), "5");
        assert_eq!(OutputValue::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
    }
}
