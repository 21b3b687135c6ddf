//! Tools module - capability interface, registry, and executor
//!
//! Tool implementations themselves live outside the core: embedding programs
//! register capabilities (image analysis, Wikipedia lookup, ...) behind the
//! [`Tool`] trait, and the core only routes calls to them.

pub mod executor;
pub mod registry;

use async_trait::async_trait;

use crate::core::ToolDescriptor;

pub use executor::ToolExecutor;
pub use registry::ToolRegistry;

/// An invocable capability registered with the core
///
/// Whatever the capability does internally (subprocess, network call,
/// in-process function) is its own concern; the core sees only
/// `(name, args) -> result-or-failure`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor exposed to the model: name, purpose, argument schema
    fn descriptor(&self) -> ToolDescriptor;

    /// Invoke the capability with the request's arguments
    async fn invoke(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String>;
}
