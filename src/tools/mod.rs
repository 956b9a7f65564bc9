//! Built-in Tools
//!
//! Tools are what the assistant may call in the middle of a turn.
//!
//! # Module Structure
//!
//! - [`calculator`](crate::tools::calculator) - `adder` and the four-function `calculator`
//! - [`search`](crate::tools::search) - web search + LLM synthesis pipeline
//! - [`registry`](crate::tools::registry) - `Tool` trait and name-unique registry
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::new()
//!     .with(Arc::new(SearchTool::new(llm, backend)))?
//!     .with(Arc::new(Adder))?;
//! let manifest = registry.describe_all();  // declared to the model
//! let adder = registry.resolve("adder").unwrap();
//! let sum = adder.execute(json!({"a": 2, "b": 3})).await?;  // "5"
//! ```

/// Arithmetic tools.
pub mod calculator;
/// Tool registry for managing available tools.
pub mod registry;
/// Web search tool.
pub mod search;

pub use calculator::{Adder, Calculator};
pub use registry::{Tool, ToolRegistry};
pub use search::SearchTool;
