//! Event layer between the tokenizer and the tree builder
//!
//! - source: one blocking read of a path or stream
//! - slice: pull events over decoded text
//! - events: the event vocabulary

pub mod events;
pub mod slice;
pub mod source;
