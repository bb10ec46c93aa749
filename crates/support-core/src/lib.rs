//! support-core - Core types and traits for the support chatbot
//!
//! This crate provides the foundational types, traits, and error handling
//! used throughout the support-rag system.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

pub use config::*;
pub use error::{Result, SupportError};
pub use traits::*;
pub use types::*;
