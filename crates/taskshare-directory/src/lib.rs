//! taskshare-directory: Share directory backends
//!
//! This crate provides backends for the collaborator traits consumed by
//! `taskshare-domain`:
//! - In-memory implementation for testing and embedding
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             taskshare-directory              │
//! ├─────────────────────────────────────────────┤
//! │  memory.rs  - In-memory ShareDirectory +    │
//! │               CategoryEnumerator            │
//! └─────────────────────────────────────────────┘
//! ```

pub mod memory;

pub use memory::MemoryShareDirectory;
