//! Hirechat Client - Main Library
//!
//! Thin presentation crate over the workspace libraries. The real work
//! lives in `chatsockets`; this crate re-exports it and hosts the demo
//! binaries.

// Re-export workspace libraries for convenience
pub use chatsockets;
