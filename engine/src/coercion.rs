//! Converting raw argument text to declared parameter types.

use std::rc::Rc;

use folio::context::ContextError;
use folio::function::{Value, ValueKind};
use folio::lexer::LexError;
use folio::parser::{parse_blocks, resolve_references};
use folio::Context;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a boolean")]
    NotABoolean(String),
    #[error("no such element '{value}' in {kind} (expected one of: {members})")]
    NoSuchElement {
        value: String,
        kind: &'static str,
        members: String,
    },
    #[error("a {got} value can not be used as {expected}")]
    Mismatch { expected: ValueKind, got: &'static str },
    #[error("{0} values can only be injected")]
    NotInjectable(ValueKind),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl CoercionError {
    /// Lexer stalls and scope overflows mean the engine itself is broken.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoercionError::Lex(_) | CoercionError::Context(_))
    }
}

/// Coerces source text. Markdown is parsed in a scope forked from
/// `context`, so calls inside it join the document's queue and link
/// definitions inside it stay local to it.
pub fn coerce(raw: &str, kind: ValueKind, context: &Rc<Context>) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    match kind {
        ValueKind::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Number)
            .ok_or_else(|| CoercionError::NotANumber(trimmed.to_string())),
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(Value::Boolean(true)),
            "false" | "no" => Ok(Value::Boolean(false)),
            _ => Err(CoercionError::NotABoolean(trimmed.to_string())),
        },
        ValueKind::Markdown => {
            let scope = context.fork()?;
            let mut nodes = parse_blocks(raw, &scope)?;
            resolve_references(&mut nodes, &scope);
            Ok(Value::Markdown(nodes))
        }
        ValueKind::Enum(enumeration) => enumeration
            .member(trimmed)
            .map(Value::Enum)
            .ok_or_else(|| CoercionError::NoSuchElement {
                value: trimmed.to_string(),
                kind: enumeration.name,
                members: enumeration.members.join(", "),
            }),
        ValueKind::Context => Err(CoercionError::NotInjectable(kind)),
    }
}

/// Checks an already-typed value against `kind`. Strings are re-read as
/// source text.
pub fn coerce_value(value: &Value, kind: ValueKind, context: &Rc<Context>) -> Result<Value, CoercionError> {
    match (value, kind) {
        (Value::Number(_), ValueKind::Number)
        | (Value::String(_), ValueKind::String)
        | (Value::Boolean(_), ValueKind::Boolean)
        | (Value::Markdown(_), ValueKind::Markdown) => Ok(value.clone()),
        (Value::Enum(member), ValueKind::Enum(_)) => coerce(member, kind, context),
        (Value::String(text), _) => coerce(text, kind, context),
        (other, expected) => Err(CoercionError::Mismatch {
            expected,
            got: other.type_name(),
        }),
    }
}
