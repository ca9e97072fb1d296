//! Parsing primitives, from raw bytes up to tokens
//!
//! - encoding: BOM and UTF-16 handling, everything leaves as UTF-8
//! - scanner: memchr-backed cursor used by the tokenizer
//! - entities: predefined, declared and character references
//! - dtd: general entities declared in the internal subset
//! - attributes: strict attribute lists
//! - tokenizer: markup constructs with their spans

pub mod attributes;
pub mod dtd;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
