//! # Ports Layer
//!
//! - `outbound.rs` - `PreferenceCache`, the small synchronous store for
//!   per-user configuration

pub mod outbound;
