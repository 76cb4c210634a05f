//! Ishtar MCP Server
//!
//! Model Context Protocol server exposing grounded question answering and
//! retrieval to AI assistants over stdio.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
