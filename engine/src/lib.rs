//! Function-call expansion and the compile pipeline.
//!
//! [`compile`] runs a document through every stage: parse into a fresh
//! context, expand queued calls against a [`Catalogue`] of libraries, render
//! HTML. The stages are also usable on their own.

pub mod coercion;
pub mod config;
pub mod expander;
pub mod library;
pub mod linker;
pub mod pipeline;

pub use config::{CompileOptions, ConfigError, FlavorChoice};
pub use expander::{
    AbortReason, CallDiagnostic, CallError, CallOutcome, EngineError, ExpansionLimits, ExpansionReport,
    FunctionCallExpander,
};
pub use library::Catalogue;
pub use linker::{FunctionArgumentsLinker, LinkError};
pub use pipeline::{CompileError, Compiled, Document, build_document, compile};
