//! Rolo daemon - a phone book managed through natural language.
//!
//! A prompt arrives over HTTP, an external chat-completions service picks
//! one of four declared tools, and the dispatch layer routes the structured
//! call to the SQLite contact store.

pub mod config;
pub mod dispatch;
pub mod routes;
pub mod server;
pub mod store;
