use rmcp::model::Tool;
use std::sync::Arc;

use crate::{
    domain::catalog::{CATALOG, ToolSpec},
    shared::selection::ToolSelection,
};

/// The catalog as exposed to the host, fixed at startup.
#[derive(Clone)]
pub struct ToolRegistry {
    specs: Arc<[&'static ToolSpec]>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(&ToolSelection::all())
    }
}

impl ToolRegistry {
    pub fn new(selection: &ToolSelection) -> Self {
        let specs: Vec<&'static ToolSpec> = CATALOG
            .iter()
            .filter(|spec| selection.allows(spec.name))
            .collect();
        Self {
            specs: specs.into(),
        }
    }

    /// Selected names that match no catalog entry.
    pub fn unmatched<'a>(selection: &'a ToolSelection) -> Vec<&'a str> {
        selection
            .names()
            .filter(|name| !CATALOG.iter().any(|spec| spec.name == *name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn resolve(&self, name: &str) -> Option<&'static ToolSpec> {
        self.specs.iter().copied().find(|spec| spec.name == name)
    }

    #[cfg(test)]
    fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.name).collect()
    }

    pub fn list(&self) -> Vec<Tool> {
        self.specs
            .iter()
            .map(|spec| Tool::new(spec.name, spec.description, Arc::new(spec.input_schema())))
            .collect()
    }
}
