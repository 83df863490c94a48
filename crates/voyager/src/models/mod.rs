//! The objects passed around by the agent loop.
//!
//! The internal message model must round-trip with the OpenAI-style chat
//! completions format the providers speak, while also carrying tool requests
//! and tool results (including failed ones) through the conversation. The
//! conversion to and from the wire format lives in `providers::utils`; the
//! structs here are provider-agnostic.

pub mod content;
pub mod message;
pub mod role;
pub mod tool;
