//! Tool registry for dynamic tool management
//!
//! The registry maps tool names to their definition and executor. The agent
//! sends [`ToolRegistry::get_tools`] to the model and dispatches each
//! `tool_use` block through [`ToolRegistry::execute`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use ticket_assist_core::agent::{Tool, ToolError, ToolExecutorFn, ToolResult};

type Entries = HashMap<String, (Tool, ToolExecutorFn)>;

/// Thread-safe tool registry
///
/// ## Example
///
/// ```ignore
/// let registry = ToolRegistry::new();
/// let (tool, executor) = ticket_lookup_tool(Arc::clone(&repository));
/// registry.register(tool, executor);
///
/// let result = registry.execute("ticket_lookup", r#"{"query": "TIC42"}"#.to_string()).await;
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<RwLock<Entries>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its executor
    ///
    /// Returns `true` if a tool with the same name was replaced.
    pub fn register(&self, tool: Tool, executor: ToolExecutorFn) -> bool {
        self.write()
            .insert(tool.name.clone(), (tool, executor))
            .is_some()
    }

    /// Execute a tool by name
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the tool is not registered or its execution
    /// fails.
    pub async fn execute(&self, name: &str, input: String) -> ToolResult {
        // Release the lock before awaiting the executor
        let executor = self.read().get(name).map(|(_, executor)| Arc::clone(executor));

        match executor {
            Some(executor) => executor(input).await,
            None => Err(ToolError::new(format!("Tool not found: {name}"))),
        }
    }

    /// Registered tool names, sorted
    #[must_use]
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// All tool definitions sorted by name, for the model request
    #[must_use]
    pub fn get_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.read().values().map(|(tool, _)| tool.clone()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Definition of one tool
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.read().get(name).map(|(tool, _)| tool.clone())
    }

    /// Remove a tool, returning whether it existed
    pub fn unregister(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Number of registered tools
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }
}
