//! Draining the pending-call queue.
//!
//! Each queued call is resolved against the expander's context, linked,
//! coerced and invoked. Whatever happens to one call stays with that call:
//! a failure replaces its children with a single error text node and is
//! reported as a [`CallDiagnostic`]. Only a broken grammar, an overflowing
//! scope or an exceeded limit stops the drain.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

use codespan_reporting::diagnostic::{Diagnostic, Label};
use folio::context::ContextError;
use folio::function::{Arguments, ArgumentValue, Function, OutputValue, Parameter, Value};
use folio::lexer::LexError;
use folio::{Context, FunctionCallNode, Node};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::coercion::{CoercionError, coerce, coerce_value};
use crate::linker::{BindingSource, FunctionArgumentsLinker, LinkError};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Bounds on one drain. Both are checked between calls, never during one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_expansions: Option<usize>,
    pub deadline: Option<Instant>,
}

impl ExpansionLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Sets the deadline to `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    fn check(&self, attempted: usize) -> Result<(), AbortReason> {
        if let Some(max) = self.max_expansions {
            if attempted >= max {
                return Err(AbortReason::ExpansionLimit(max));
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(AbortReason::Deadline),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("the limit of {0} expansions was reached")]
    ExpansionLimit(usize),
    #[error("the deadline passed")]
    Deadline,
}

/// Failures that stop expansion of the whole document.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expansion aborted after {expanded} calls: {reason}")]
    Aborted { expanded: usize, reason: AbortReason },
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl EngineError {
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        match self {
            EngineError::Lex(error) => error.to_diagnostic(file_id),
            EngineError::Context(error) => error.to_diagnostic(),
            EngineError::Aborted { .. } => Diagnostic::error().with_message(self.to_string()),
        }
    }
}

/// Why a single call could not be expanded.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("unresolved reference to function '{0}'")]
    Unresolved(String),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("argument '{parameter}': {source}")]
    Coercion {
        parameter: String,
        #[source]
        source: CoercionError,
    },
    #[error("{0:#}")]
    Body(anyhow::Error),
    #[error("function panicked: {0}")]
    Panic(String),
}

enum Failure {
    Call(CallError),
    Fatal(EngineError),
}

impl From<CallError> for Failure {
    fn from(error: CallError) -> Self {
        Failure::Call(error)
    }
}

impl From<LinkError> for Failure {
    fn from(error: LinkError) -> Self {
        Failure::Call(error.into())
    }
}

fn coercion_failure(parameter: &Parameter, error: CoercionError) -> Failure {
    match error {
        CoercionError::Lex(error) => Failure::Fatal(error.into()),
        CoercionError::Context(error) => Failure::Fatal(error.into()),
        source => Failure::Call(CallError::Coercion {
            parameter: parameter.name.clone(),
            source,
        }),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A recovered call failure.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDiagnostic {
    /// The call's signature, e.g. `sum(2, x)`.
    pub call: String,
    /// Byte span of the call, relative to the source it was parsed from.
    pub span: Range<usize>,
    pub message: String,
}

impl CallDiagnostic {
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        Diagnostic::warning()
            .with_message(format!("error in {}", self.call))
            .with_labels(vec![Label::primary(file_id, self.span.clone()).with_message(&self.message)])
    }
}

impl fmt::Display for CallDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in {}: {}", self.call, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionReport {
    pub expanded: usize,
    pub failed: usize,
    pub diagnostics: Vec<CallDiagnostic>,
}

impl ExpansionReport {
    fn attempted(&self) -> usize {
        self.expanded + self.failed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Expanded,
    /// The call's children now hold the error text.
    Failed(CallDiagnostic),
    /// The call had been expanded before; nothing changed.
    AlreadyExpanded,
}

// ---------------------------------------------------------------------------
// Expander
// ---------------------------------------------------------------------------

pub struct FunctionCallExpander {
    context: Rc<Context>,
    limits: ExpansionLimits,
}

impl FunctionCallExpander {
    /// `context` should be the document's root: calls are resolved against
    /// its libraries, and its queue is the one drained.
    pub fn new(context: Rc<Context>) -> Self {
        FunctionCallExpander {
            context,
            limits: ExpansionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    /// Expands queued calls in FIFO order until the queue is empty,
    /// including calls queued by earlier expansions.
    pub fn expand_all(&self) -> Result<ExpansionReport, EngineError> {
        let mut report = ExpansionReport::default();
        while let Some(call) = self.context.pop_function_call() {
            self.limits.check(report.attempted()).map_err(|reason| EngineError::Aborted {
                expanded: report.attempted(),
                reason,
            })?;
            match self.expand(&call)? {
                CallOutcome::Expanded => report.expanded += 1,
                CallOutcome::Failed(diagnostic) => {
                    report.failed += 1;
                    report.diagnostics.push(diagnostic);
                }
                CallOutcome::AlreadyExpanded => {}
            }
        }
        debug!(
            "expansion finished: {} expanded, {} failed",
            report.expanded, report.failed
        );
        Ok(report)
    }

    /// Expands one call, storing the result as its children.
    pub fn expand(&self, call: &FunctionCallNode) -> Result<CallOutcome, EngineError> {
        if call.is_expanded() {
            return Ok(CallOutcome::AlreadyExpanded);
        }
        trace!("expanding {}", call.signature());

        let (children, outcome) = match self.invoke(call) {
            Ok(output) => (into_nodes(output), CallOutcome::Expanded),
            Err(Failure::Fatal(error)) => return Err(error),
            Err(Failure::Call(error)) => {
                let diagnostic = CallDiagnostic {
                    call: call.signature(),
                    span: call.span.clone(),
                    message: error.to_string(),
                };
                warn!("{}", diagnostic);
                (vec![Node::Text(diagnostic.to_string())], CallOutcome::Failed(diagnostic))
            }
        };

        match call.set_children(children) {
            Ok(()) => Ok(outcome),
            // Expanded from inside its own invocation; the first result stands.
            Err(_) => Ok(CallOutcome::AlreadyExpanded),
        }
    }

    fn invoke(&self, call: &FunctionCallNode) -> Result<OutputValue, Failure> {
        let function = self
            .context
            .function_by_name(&call.name)
            .ok_or_else(|| CallError::Unresolved(call.name.clone()))?;
        let arguments = self.bind(&function, call)?;

        match panic::catch_unwind(AssertUnwindSafe(|| function.invoke(&arguments))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(error)) => Err(CallError::Body(error).into()),
            Err(payload) => Err(CallError::Panic(panic_message(payload.as_ref())).into()),
        }
    }

    /// Binds and coerces every argument. If any fails, calls queued by
    /// markdown arguments already coerced are dropped with them.
    fn bind(&self, function: &Function, call: &FunctionCallNode) -> Result<Arguments, Failure> {
        let queued = self.context.pending_calls();
        self.coerce_arguments(function, call).inspect_err(|_| {
            let dropped = self.context.discard_calls_after(queued);
            if dropped > 0 {
                debug!("dropped {} calls queued by the arguments of {}", dropped, call.signature());
            }
        })
    }

    fn coerce_arguments(&self, function: &Function, call: &FunctionCallNode) -> Result<Arguments, Failure> {
        let bindings = FunctionArgumentsLinker::new(function, call).link()?;
        let mut values = HashMap::with_capacity(bindings.len());
        for binding in bindings {
            let parameter = binding.parameter;
            let value = match binding.source {
                BindingSource::Injected => Ok(Value::Context(Rc::clone(&self.context))),
                BindingSource::Default(raw) => coerce(raw, parameter.kind, &self.context),
                BindingSource::Argument(argument) => match &argument.value {
                    ArgumentValue::Raw(raw) => coerce(raw, parameter.kind, &self.context),
                    ArgumentValue::Typed(value) => coerce_value(value, parameter.kind, &self.context),
                },
            };
            let value = value.map_err(|error| coercion_failure(parameter, error))?;
            values.insert(parameter.name.clone(), value);
        }
        Ok(Arguments::new(function.name(), values))
    }
}

fn into_nodes(output: OutputValue) -> Vec<Node> {
    match output {
        OutputValue::Node(node) => vec![node],
        OutputValue::Markdown(nodes) => nodes,
        OutputValue::Void => Vec::new(),
        scalar => vec![Node::Text(scalar.to_string())],
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
