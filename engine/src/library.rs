use std::sync::Arc;

use folio::function::Library;
use folio::Context;

/// An ordered set of libraries, built once and registered into every
/// document compiled with it. Libraries are shared, never copied, so a
/// catalogue can serve documents compiled on several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    libraries: Vec<Arc<Library>>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, library: Library) -> Self {
        self.add(library);
        self
    }

    pub fn add(&mut self, library: Library) {
        self.libraries.push(Arc::new(library));
    }

    pub fn libraries(&self) -> &[Arc<Library>] {
        &self.libraries
    }

    /// Registers every library in order, so later ones take precedence.
    pub fn register_into(&self, context: &Context) {
        for library in &self.libraries {
            context.register_library(Arc::clone(library));
        }
    }
}
