//! tellls/crates/tl-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Tellls.

pub mod cascade;
pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
