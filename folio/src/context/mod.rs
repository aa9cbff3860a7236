//! The context built while parsing a document.
//!
//! A root [`Context`] is created per document. Nested content is parsed in
//! scopes forked from it. Every scope holds an owned reference to its parent
//! and a shared handle on the document-wide state, so pending calls, the
//! math flag and document metadata converge in one place no matter how deep
//! the scope that wrote them.

mod document;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use codespan_reporting::diagnostic::Diagnostic;
use log::debug;
use thiserror::Error;

pub use document::{DocumentInfo, DocumentType};

use crate::ast::{FunctionCallNode, LinkDefinition, normalize_label};
use crate::flavor::Flavor;
use crate::function::{Function, Library};

/// Maximum nesting of forked scopes. Parent walks are bounded by it too.
pub const MAX_SCOPE_DEPTH: usize = 64;

#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error("scope nesting exceeds the limit of {limit} levels")]
    ScopeTooDeep { limit: usize },
}

impl ContextError {
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::bug().with_message(self.to_string())
    }
}

/// State owned by the document as a whole.
#[derive(Default)]
struct DocumentState {
    pending: RefCell<VecDeque<Rc<FunctionCallNode>>>,
    has_math: Cell<bool>,
    info: RefCell<DocumentInfo>,
}

pub struct Context {
    parent: Option<Rc<Context>>,
    depth: usize,
    flavor: Arc<Flavor>,
    state: Rc<DocumentState>,
    libraries: RefCell<Vec<Arc<Library>>>,
    link_definitions: RefCell<Vec<LinkDefinition>>,
}

impl Context {
    /// A fresh root context for one document.
    pub fn new(flavor: Arc<Flavor>) -> Rc<Self> {
        Rc::new(Context {
            parent: None,
            depth: 0,
            flavor,
            state: Rc::new(DocumentState::default()),
            libraries: RefCell::new(Vec::new()),
            link_definitions: RefCell::new(Vec::new()),
        })
    }

    /// A child scope. It shadows the parent's functions and link
    /// definitions with its own and shares the document-wide state.
    pub fn fork(self: &Rc<Self>) -> Result<Rc<Self>, ContextError> {
        let depth = self.depth + 1;
        if depth > MAX_SCOPE_DEPTH {
            return Err(ContextError::ScopeTooDeep {
                limit: MAX_SCOPE_DEPTH,
            });
        }
        Ok(Rc::new(Context {
            parent: Some(Rc::clone(self)),
            depth,
            flavor: Arc::clone(&self.flavor),
            state: Rc::clone(&self.state),
            libraries: RefCell::new(Vec::new()),
            link_definitions: RefCell::new(Vec::new()),
        }))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of forks between this scope and the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<&Rc<Context>> {
        self.parent.as_ref()
    }

    pub fn flavor(&self) -> &Arc<Flavor> {
        &self.flavor
    }

    /// This context followed by its ancestors, innermost first.
    fn lineage(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |&c| c.parent.as_deref()).take(MAX_SCOPE_DEPTH + 1)
    }

    // -----------------------------------------------------------------------
    // Link definitions
    // -----------------------------------------------------------------------

    pub fn register_link_definition(&self, definition: LinkDefinition) {
        debug!("link definition [{}] -> {}", definition.label, definition.url);
        self.link_definitions.borrow_mut().push(definition);
    }

    /// Finds a definition by normalized label, closest scope first. Within a
    /// scope the latest definition wins.
    pub fn link_definition(&self, label: &str) -> Option<LinkDefinition> {
        let wanted = normalize_label(label);
        self.lineage().find_map(|scope| {
            scope
                .link_definitions
                .borrow()
                .iter()
                .rev()
                .find(|d| normalize_label(&d.label) == wanted)
                .cloned()
        })
    }

    // -----------------------------------------------------------------------
    // Function calls
    // -----------------------------------------------------------------------

    /// Queues a call for expansion at the document level.
    pub fn register_function_call(&self, call: Rc<FunctionCallNode>) {
        debug!("queued call .{} at depth {}", call.name, self.depth);
        self.state.pending.borrow_mut().push_back(call);
    }

    /// The oldest queued call.
    pub fn pop_function_call(&self) -> Option<Rc<FunctionCallNode>> {
        self.state.pending.borrow_mut().pop_front()
    }

    pub fn pending_calls(&self) -> usize {
        self.state.pending.borrow().len()
    }

    /// Drops every call queued since the queue held `len` calls. Returns how
    /// many were dropped.
    pub fn discard_calls_after(&self, len: usize) -> usize {
        let mut pending = self.state.pending.borrow_mut();
        let dropped = pending.len().saturating_sub(len);
        pending.truncate(len);
        dropped
    }

    // -----------------------------------------------------------------------
    // Libraries
    // -----------------------------------------------------------------------

    pub fn register_library(&self, library: Arc<Library>) {
        debug!("library '{}' registered at depth {}", library.name(), self.depth);
        self.libraries.borrow_mut().push(library);
    }

    /// Resolves a function: this scope's libraries newest first, then the
    /// parent's.
    pub fn function_by_name(&self, name: &str) -> Option<Arc<Function>> {
        self.lineage().find_map(|scope| {
            scope
                .libraries
                .borrow()
                .iter()
                .rev()
                .find_map(|library| library.function(name).cloned())
        })
    }

    // -----------------------------------------------------------------------
    // Ancestry
    // -----------------------------------------------------------------------

    /// Walks from this context toward the root and returns the outermost
    /// context of the first run of contexts satisfying `predicate`. The walk
    /// stops at the first context that fails after a match.
    pub fn last_ancestor_matching(
        self: &Rc<Self>,
        predicate: impl Fn(&Context) -> bool,
    ) -> Option<Rc<Context>> {
        let mut found: Option<Rc<Context>> = None;
        let mut current = Some(Rc::clone(self));
        let mut steps = 0;
        while let Some(context) = current {
            if steps > MAX_SCOPE_DEPTH {
                break;
            }
            steps += 1;
            if predicate(&context) {
                current = context.parent.clone();
                found = Some(context);
            } else if found.is_some() {
                break;
            } else {
                current = context.parent.clone();
            }
        }
        found
    }

    // -----------------------------------------------------------------------
    // Document-wide state
    // -----------------------------------------------------------------------

    pub fn has_math(&self) -> bool {
        self.state.has_math.get()
    }

    /// The flag only ever goes from false to true.
    pub fn set_has_math(&self) {
        self.state.has_math.set(true);
    }

    pub fn document_info(&self) -> Ref<'_, DocumentInfo> {
        self.state.info.borrow()
    }

    pub fn document_info_mut(&self) -> RefMut<'_, DocumentInfo> {
        self.state.info.borrow_mut()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth)
            .field("flavor", &self.flavor.name())
            .field("libraries", &self.libraries.borrow().len())
            .field("link_definitions", &self.link_definitions.borrow().len())
            .field("pending_calls", &self.pending_calls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Rc<Context> {
        Context::new(Flavor::extended().unwrap())
    }

    #[test]
    fn discarding_calls_truncates_the_queue() {
        let root = root();
        let child = root.fork().unwrap();
        for name in ["a", "b", "c"] {
            child.register_function_call(Rc::new(FunctionCallNode::new(name, vec![], 0..1, true)));
        }
        assert_eq!(root.discard_calls_after(1), 2);
        assert_eq!(root.discard_calls_after(5), 0);
        assert_eq!(root.pending_calls(), 1);
        assert_eq!(root.pop_function_call().unwrap().name, "a");
    }

    #[test]
    fn fork_depth_is_bounded() {
        let mut scope = root();
        for _ in 0..MAX_SCOPE_DEPTH {
            scope = scope.fork().unwrap();
        }
        assert_eq!(scope.depth(), MAX_SCOPE_DEPTH);
        assert!(matches!(scope.fork(), Err(ContextError::ScopeTooDeep { .. })));
    }

    #[test]
    fn link_definitions_are_inherited_and_shadowed() {
        let root = root();
        root.register_link_definition(LinkDefinition::new("Home", "/", None));
        let child = root.fork().unwrap();
        assert_eq!(child.link_definition("home").unwrap().url, "/");

        child.register_link_definition(LinkDefinition::new("home", "/child", None));
        assert_eq!(child.link_definition("HOME").unwrap().url, "/child");
        assert_eq!(root.link_definition("home").unwrap().url, "/");
        assert!(root.link_definition("missing").is_none());
    }

    #[test]
    fn document_state_is_shared() {
        let root = root();
        let child = root.fork().unwrap().fork().unwrap();
        child.set_has_math();
        child.document_info_mut().name = Some("Report".into());
        assert!(root.has_math());
        assert_eq!(root.document_info().name.as_deref(), Some("Report"));
    }

    #[test]
    fn last_ancestor_matching_returns_outermost_of_first_run() {
        let root = root();
        let a = root.fork().unwrap();
        let b = a.fork().unwrap();
        let c = b.fork().unwrap();

        // c and b match, a does not: the run stops at b.
        let found = c.last_ancestor_matching(|ctx| ctx.depth() >= 2).unwrap();
        assert_eq!(found.depth(), 2);

        // Self does not match, the run starts further up.
        let found = c.last_ancestor_matching(|ctx| ctx.depth() <= 1).unwrap();
        assert!(found.is_root());

        assert!(c.last_ancestor_matching(|_| false).is_none());
    }
}
