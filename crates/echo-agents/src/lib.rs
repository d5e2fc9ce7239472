//! Echo Stage Agents
//!
//! Default implementations of the four pipeline stage capabilities:
//! an LLM-backed planner and editor speaking to an OpenAI-compatible
//! chat-completions endpoint, a subprocess test-command verifier, and a
//! git + GitHub pull-request publisher.
//!
//! The pipeline core never depends on this crate; the CLI wires these in
//! at composition time. Any of them can be swapped for another
//! implementation of the corresponding `echo-core` trait.

pub mod config;
pub mod editor;
pub mod error;
pub mod llm;
pub mod planner;
pub mod publisher;
pub mod verifier;

// Re-export commonly used types
pub use config::AgentConfig;
pub use editor::LlmEditor;
pub use error::AgentError;
pub use llm::ChatClient;
pub use planner::LlmPlanner;
pub use publisher::GitPublisher;
pub use verifier::CommandVerifier;
