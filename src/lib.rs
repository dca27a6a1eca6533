//! Eve — a function-calling conversational assistant.
//!
//! Each user turn runs a two-stage pipeline: a tool-selection completion
//! decides whether an external data tool (weather, news, search) should
//! run, then a streamed response-generation completion composes the reply
//! with the tool's result as context.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod tools;
