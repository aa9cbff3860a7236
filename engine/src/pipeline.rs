//! Source text to rendered output, one document at a time.

use std::rc::Rc;

use codespan_reporting::diagnostic::Diagnostic;
use folio::lexer::GrammarError;
use folio::{Context, DocumentInfo, Flavor, LexError, Node, parse_blocks};
use log::debug;
use render::{HtmlRenderer, NodeRenderer, PlainTextRenderer};
use thiserror::Error;

use crate::config::{CompileOptions, FlavorChoice};
use crate::expander::{EngineError, ExpansionReport, FunctionCallExpander};
use crate::library::Catalogue;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("grammar could not be built: {0}")]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CompileError {
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        match self {
            CompileError::Grammar(error) => Diagnostic::bug().with_message(error.to_string()),
            CompileError::Lex(error) => error.to_diagnostic(file_id),
            CompileError::Engine(error) => error.to_diagnostic(file_id),
        }
    }
}

/// A parsed and expanded document, ready to render.
#[derive(Debug)]
pub struct Document {
    pub context: Rc<Context>,
    pub nodes: Vec<Node>,
    pub report: ExpansionReport,
}

impl Document {
    pub fn render_html(&self, pretty: bool) -> String {
        HtmlRenderer::new(&self.context).pretty(pretty).render_all(&self.nodes)
    }

    pub fn render_plain(&self) -> String {
        PlainTextRenderer::new().render_all(&self.nodes)
    }

    pub fn info(&self) -> DocumentInfo {
        self.context.document_info().clone()
    }
}

/// The result of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub html: String,
    pub info: DocumentInfo,
    pub has_math: bool,
    pub report: ExpansionReport,
}

/// Parses `source` in a fresh root context with `catalogue` registered, then
/// expands every call.
pub fn build_document(source: &str, catalogue: &Catalogue, options: &CompileOptions) -> Result<Document, CompileError> {
    let flavor = match options.flavor {
        FlavorChoice::Base => Flavor::base()?,
        FlavorChoice::Extended => Flavor::extended()?,
    };
    let context = Context::new(flavor);
    {
        let mut info = context.document_info_mut();
        info.doc_type = options.document_type;
        info.name = options.name.clone();
        info.author = options.author.clone();
        info.locale = options.locale.clone();
    }
    catalogue.register_into(&context);

    let nodes = parse_blocks(source, &context)?;
    debug!("parsed {} blocks, {} calls queued", nodes.len(), context.pending_calls());

    let report = FunctionCallExpander::new(Rc::clone(&context))
        .with_limits(options.limits())
        .expand_all()?;

    Ok(Document { context, nodes, report })
}

/// Compiles `source` to HTML.
pub fn compile(source: &str, catalogue: &Catalogue, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let document = build_document(source, catalogue, options)?;
    let html = document.render_html(options.pretty);
    Ok(Compiled {
        html,
        info: document.info(),
        has_math: document.context.has_math(),
        report: document.report,
    })
}
