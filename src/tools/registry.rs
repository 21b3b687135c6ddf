//! Tool registry - name-keyed capability lookup
//!
//! Built once at startup from the capabilities the embedding program
//! supplies; read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ToolDescriptor;
use crate::tools::Tool;

/// Registry of available capabilities
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its descriptor name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.descriptor().name, tool);
    }

    /// Look up a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check whether a capability is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors of every registered capability, for the model adapter
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor()).collect();
        // Stable order so identical registries produce identical prompts
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no capability is registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
