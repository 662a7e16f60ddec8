//! LLM provider adapters and routing.

pub mod openai_compat;
pub mod registry;
pub mod traits;
mod util;

pub use openai_compat::OpenAiCompatProvider;
pub use registry::{ProviderRegistry, RegisteredModel, Resolved};
pub use traits::{ChatRequest, ChatResponse, LlmProvider};
pub use util::resolve_api_key;
