use crate::function::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// Unparsed source text, coerced when the call is linked.
    Raw(String),
    /// A value that is already typed.
    Typed(Value),
}

/// One argument at a call site.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallArgument {
    /// Set for `name:{value}` arguments.
    pub name: Option<String>,
    pub value: ArgumentValue,
    /// The indented block following a block call.
    pub is_body: bool,
}

impl FunctionCallArgument {
    pub fn raw(text: impl Into<String>) -> Self {
        FunctionCallArgument {
            name: None,
            value: ArgumentValue::Raw(text.into()),
            is_body: false,
        }
    }

    pub fn named(name: impl Into<String>, text: impl Into<String>) -> Self {
        FunctionCallArgument {
            name: Some(name.into()),
            ..Self::raw(text)
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        FunctionCallArgument {
            is_body: true,
            ..Self::raw(text)
        }
    }

    pub fn typed(value: Value) -> Self {
        FunctionCallArgument {
            name: None,
            value: ArgumentValue::Typed(value),
            is_body: false,
        }
    }
}
