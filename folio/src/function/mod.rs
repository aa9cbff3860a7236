//! Function descriptors and the values that flow in and out of them.
//!
//! A [`Function`] is described once at registration time: a name, an ordered
//! parameter list and a type-erased body. Nothing is discovered by
//! inspecting the body at runtime.

mod argument;
mod value;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, bail};

pub use argument::{ArgumentValue, FunctionCallArgument};
pub use value::{EnumKind, OutputValue, Value, ValueKind};

use crate::ast::Node;
use crate::context::Context;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ValueKind,
    /// Raw text coerced like a call argument when the caller omits the parameter.
    pub default: Option<String>,
    /// Supplied by the engine rather than the caller.
    pub injected: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Parameter {
            name: name.into(),
            kind,
            default: None,
            injected: false,
        }
    }

    /// An injected parameter receiving the calling context.
    pub fn context(name: impl Into<String>) -> Self {
        Parameter {
            injected: true,
            ..Parameter::new(name, ValueKind::Context)
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        !self.injected && self.default.is_none()
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

type Body = Box<dyn Fn(&Arguments) -> anyhow::Result<OutputValue> + Send + Sync>;

pub struct Function {
    name: String,
    parameters: Vec<Parameter>,
    body: Option<Body>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            parameters: Vec::new(),
            body: None,
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<OutputValue> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn invoke(&self, arguments: &Arguments) -> anyhow::Result<OutputValue> {
        match &self.body {
            Some(body) => body(arguments),
            None => bail!("function '{}' has no body", self.name),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A named, ordered set of functions. Shared read-only between documents.
#[derive(Debug)]
pub struct Library {
    name: String,
    functions: Vec<Arc<Function>>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Library {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn with(mut self, function: Function) -> Self {
        self.functions.push(Arc::new(function));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    /// The last function registered under `name`.
    pub fn function(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.iter().rev().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Bound, typed arguments for one invocation.
#[derive(Debug, Clone)]
pub struct Arguments {
    function: String,
    values: HashMap<String, Value>,
}

impl Arguments {
    pub fn new(function: impl Into<String>, values: HashMap<String, Value>) -> Self {
        Arguments {
            function: function.into(),
            values,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn require(&self, name: &str) -> anyhow::Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow!("{}: no argument bound to '{}'", self.function, name))
    }

    fn mismatch(&self, name: &str, expected: &str, got: &Value) -> anyhow::Error {
        anyhow!(
            "{}: argument '{}' is a {}, expected {}",
            self.function,
            name,
            got.type_name(),
            expected
        )
    }

    pub fn number(&self, name: &str) -> anyhow::Result<f64> {
        match self.require(name)? {
            Value::Number(n) => Ok(*n),
            other => Err(self.mismatch(name, "number", other)),
        }
    }

    pub fn string(&self, name: &str) -> anyhow::Result<&str> {
        match self.require(name)? {
            Value::String(s) => Ok(s),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    pub fn boolean(&self, name: &str) -> anyhow::Result<bool> {
        match self.require(name)? {
            Value::Boolean(b) => Ok(*b),
            other => Err(self.mismatch(name, "boolean", other)),
        }
    }

    pub fn markdown(&self, name: &str) -> anyhow::Result<&[Node]> {
        match self.require(name)? {
            Value::Markdown(nodes) => Ok(nodes),
            other => Err(self.mismatch(name, "markdown", other)),
        }
    }

    pub fn enum_member(&self, name: &str) -> anyhow::Result<&'static str> {
        match self.require(name)? {
            Value::Enum(member) => Ok(member),
            other => Err(self.mismatch(name, "enum", other)),
        }
    }

    pub fn context(&self, name: &str) -> anyhow::Result<&Rc<Context>> {
        match self.require(name)? {
            Value::Context(context) => Ok(context),
            other => Err(self.mismatch(name, "context", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let library = Library::new("lib")
            .with(Function::new("f").body(|_| Ok(OutputValue::Number(1.0))))
            .with(Function::new("f").body(|_| Ok(OutputValue::Number(2.0))));
        let f = library.function("f").unwrap();
        let args = Arguments::new("f", HashMap::new());
        assert_eq!(f.invoke(&args).unwrap(), OutputValue::Number(2.0));
    }

    #[test]
    fn bodyless_function_fails_on_invoke() {
        let f = Function::new("empty");
        let err = f.invoke(&Arguments::new("empty", HashMap::new())).unwrap_err();
        assert!(err.to_string().contains("no body"));
    }

    #[test]
    fn typed_accessors_report_mismatches() {
        let mut values = HashMap::new();
        values.insert("a".to_string(), Value::String("x".into()));
        let args = Arguments::new("f", values);
        assert_eq!(args.string("a").unwrap(), "x");
        let err = args.number("a").unwrap_err().to_string();
        assert!(err.contains("expected number"), "{err}");
        assert!(args.boolean("missing").is_err());
    }

    #[test]
    fn injected_parameters_are_not_required() {
        assert!(!Parameter::context("ctx").is_required());
        assert!(!Parameter::new("x", ValueKind::Number).with_default("1").is_required());
        assert!(Parameter::new("x", ValueKind::Number).is_required());
    }
}
