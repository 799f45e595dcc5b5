//! Core types for gateway requests
//!
//! Provider-agnostic conversation values shared by every adapter.

mod message;
mod function;
mod cancellation;

pub use message::{Message, MessageError, MessageRole};
pub use function::{Completion, FunctionCall, FunctionDefinition};
pub use cancellation::CancellationToken;
