//! Binding call-site arguments to declared parameters.
//!
//! Unnamed arguments bind positionally to the parameters not claimed by a
//! named argument, in declaration order. A call body is the last unnamed
//! argument, so it takes the next free slot. Injected parameters never
//! consume a slot.

use folio::FunctionCallNode;
use folio::function::{Function, FunctionCallArgument, Parameter};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("missing argument for parameter '{0}'")]
    MissingArgument(String),
    #[error("too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments { expected: usize, got: usize },
    #[error("no parameter named '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{0}' is bound more than once")]
    DuplicateBinding(String),
}

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingSource<'a> {
    Argument(&'a FunctionCallArgument),
    /// The parameter's raw default text.
    Default(&'a str),
    /// Supplied by the engine.
    Injected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding<'a> {
    pub parameter: &'a Parameter,
    pub source: BindingSource<'a>,
}

pub struct FunctionArgumentsLinker<'a> {
    function: &'a Function,
    call: &'a FunctionCallNode,
}

impl<'a> FunctionArgumentsLinker<'a> {
    pub fn new(function: &'a Function, call: &'a FunctionCallNode) -> Self {
        FunctionArgumentsLinker { function, call }
    }

    /// One binding per parameter, in declaration order.
    pub fn link(&self) -> Result<Vec<Binding<'a>>, LinkError> {
        let call: &'a FunctionCallNode = self.call;
        let parameters: &'a [Parameter] = self.function.parameters();
        let mut bound: Vec<Option<&'a FunctionCallArgument>> = vec![None; parameters.len()];

        for argument in &call.arguments {
            let Some(name) = &argument.name else { continue };
            let index = parameters
                .iter()
                .position(|p| !p.injected && &p.name == name)
                .ok_or_else(|| LinkError::UnknownParameter(name.clone()))?;
            if bound[index].is_some() {
                return Err(LinkError::DuplicateBinding(name.clone()));
            }
            bound[index] = Some(argument);
        }

        // Unnamed arguments, the body included, fill what named ones left.
        let free: Vec<usize> = (0..parameters.len())
            .filter(|&i| !parameters[i].injected && bound[i].is_none())
            .collect();
        let unnamed: Vec<&'a FunctionCallArgument> = call.arguments.iter().filter(|a| a.name.is_none()).collect();
        if unnamed.len() > free.len() {
            return Err(LinkError::TooManyArguments {
                expected: free.len(),
                got: unnamed.len(),
            });
        }
        for (index, argument) in free.into_iter().zip(unnamed) {
            bound[index] = Some(argument);
        }

        parameters
            .iter()
            .zip(bound)
            .map(|(parameter, argument)| {
                let source = match (argument, &parameter.default) {
                    _ if parameter.injected => BindingSource::Injected,
                    (Some(argument), _) => BindingSource::Argument(argument),
                    (None, Some(default)) => BindingSource::Default(default),
                    (None, None) => return Err(LinkError::MissingArgument(parameter.name.clone())),
                };
                Ok(Binding { parameter, source })
            })
            .collect()
    }

    /// Whether [`link`](Self::link) would succeed.
    pub fn is_compliant(&self) -> bool {
        self.link().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::function::{OutputValue, ValueKind};

    fn function() -> Function {
        Function::new("f")
            .param(Parameter::new("a", ValueKind::Number))
            .param(Parameter::context("ctx"))
            .param(Parameter::new("b", ValueKind::String).with_default("x"))
            .body(|_| Ok(OutputValue::Void))
    }

    fn call(arguments: Vec<FunctionCallArgument>) -> FunctionCallNode {
        FunctionCallNode::new("f", arguments, 0..1, true)
    }

    fn raw_of(binding: &Binding<'_>) -> Option<String> {
        match binding.source {
            BindingSource::Argument(arg) => match &arg.value {
                folio::function::ArgumentValue::Raw(raw) => Some(raw.clone()),
                _ => None,
            },
            BindingSource::Default(default) => Some(format!("default:{default}")),
            BindingSource::Injected => None,
        }
    }

    #[test]
    fn positional_binding_skips_injected() {
        let f = function();
        let c = call(vec![FunctionCallArgument::raw("1"), FunctionCallArgument::raw("two")]);
        let bindings = FunctionArgumentsLinker::new(&f, &c).link().unwrap();
        assert_eq!(bindings.len(), 3);
        assert_eq!(raw_of(&bindings[0]).as_deref(), Some("1"));
        assert_eq!(bindings[1].source, BindingSource::Injected);
        assert_eq!(raw_of(&bindings[2]).as_deref(), Some("two"));
    }

    #[test]
    fn defaults_fill_missing_optionals() {
        let f = function();
        let c = call(vec![FunctionCallArgument::raw("1")]);
        let bindings = FunctionArgumentsLinker::new(&f, &c).link().unwrap();
        assert_eq!(raw_of(&bindings[2]).as_deref(), Some("default:x"));
    }

    #[test]
    fn named_arguments_free_positional_slots() {
        let f = function();
        let c = call(vec![FunctionCallArgument::named("a", "1"), FunctionCallArgument::raw("two")]);
        let bindings = FunctionArgumentsLinker::new(&f, &c).link().unwrap();
        assert_eq!(raw_of(&bindings[0]).as_deref(), Some("1"));
        assert_eq!(raw_of(&bindings[2]).as_deref(), Some("two"));
    }

    #[test]
    fn body_takes_the_next_free_slot() {
        let f = function();
        let c = call(vec![FunctionCallArgument::raw("1"), FunctionCallArgument::body("text")]);
        let bindings = FunctionArgumentsLinker::new(&f, &c).link().unwrap();
        assert_eq!(raw_of(&bindings[2]).as_deref(), Some("text"));
    }

    #[test]
    fn failures_are_typed() {
        let f = function();
        let link = |args| FunctionArgumentsLinker::new(&f, &call(args)).link().map(|_| ());

        assert_eq!(link(vec![]), Err(LinkError::MissingArgument("a".into())));
        assert_eq!(
            link(vec![
                FunctionCallArgument::raw("1"),
                FunctionCallArgument::raw("2"),
                FunctionCallArgument::raw("3"),
            ]),
            Err(LinkError::TooManyArguments { expected: 2, got: 3 })
        );
        assert_eq!(
            link(vec![
                FunctionCallArgument::named("a", "1"),
                FunctionCallArgument::raw("2"),
                FunctionCallArgument::raw("3"),
            ]),
            Err(LinkError::TooManyArguments { expected: 1, got: 2 })
        );
        assert_eq!(
            link(vec![FunctionCallArgument::named("ctx", "x")]),
            Err(LinkError::UnknownParameter("ctx".into()))
        );
        assert_eq!(
            link(vec![FunctionCallArgument::named("a", "1"), FunctionCallArgument::named("a", "2")]),
            Err(LinkError::DuplicateBinding("a".into()))
        );
    }

    #[test]
    fn compliance_mirrors_linking() {
        let f = function();
        assert!(FunctionArgumentsLinker::new(&f, &call(vec![FunctionCallArgument::raw("1")])).is_compliant());
        assert!(!FunctionArgumentsLinker::new(&f, &call(vec![])).is_compliant());
    }
}
