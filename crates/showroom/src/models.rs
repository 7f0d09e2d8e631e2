//! These models represent the objects passed around by the orchestrator.
//!
//! There are several related formats in play:
//! - the chat endpoint's request body and the raw component JSON it returns
//! - openai messages/tools/response_format, sent to the LLM
//! - the vector store's document and metadata shapes
//!
//! Incoming and outgoing data is converted to these internal structs at the
//! boundary; nothing downstream works with the wire formats directly.

pub mod car;
pub mod component;
pub mod message;
pub mod role;
pub mod tool;
