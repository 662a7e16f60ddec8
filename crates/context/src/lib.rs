//! Cross-panel context: the TTL cache over the transcript store, the pure
//! message assembler, and the service that ties read path and write path
//! together for the gateway.

pub mod assemble;
pub mod cache;
pub mod service;

pub use assemble::{assemble, clamp_budget, ContextRequest, DEFAULT_TURN_BUDGET, MAX_TURN_BUDGET};
pub use cache::{canonical_key, ContextCache};
pub use service::{ContextService, ContextStats};
