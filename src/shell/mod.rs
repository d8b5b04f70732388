//! Shell Module
//!
//! Line-oriented command interface over a `Cache<String, String>`.
//!
//! # Commands
//! - `GET key` - Retrieve a value
//! - `PUT key value...` - Store a value (rest of the line)
//! - `DEL key` - Remove a key
//! - `CLEAR` - Remove every entry
//! - `STATS` - Print cache statistics as JSON
//! - `SAVE path` - Write a snapshot to a file
//! - `LOAD path` - Replace the cache with a snapshot from a file
//! - `HELP` - List commands
//! - `QUIT` - Exit

pub mod command;
pub mod handlers;

pub use command::Command;
pub use handlers::{Reply, Session};
