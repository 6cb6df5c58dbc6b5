//! Moonveil Core Library
//!
//! This crate provides the core functionality for Moonveil:
//! - Luau tokenization and layout-preserving rendering
//! - The ordered obfuscation pass pipeline
//! - Opaque predicate and junk statement generation
//! - String encryption and the runtime decryption preamble
//! - Global access virtualization through an environment proxy
//! - TOML-driven run configuration

pub mod config;
pub mod error;
pub mod lexer;
pub mod pipeline;

mod crypt;
mod junk;
mod numeric;
mod passes;
mod preamble;
mod predicate;
mod sample;
mod scanner;

// Re-export commonly used types
pub use config::{GlobalsConfig, ObfuscatorConfig, PassConfig, VirtualizeMode};
pub use error::SkipReason;
pub use lexer::{lex, render, Token, TokenKind};
pub use pipeline::{ObfuscationResult, ObfuscationStats, Obfuscator};
