//! # Integration Tests
//!
//! - `inventory` - stock conservation and low-stock selection
//! - `persistence` - file-backed store across reopen, backup and restore
//! - `flows` - state container and runtime over a real store

pub mod flows;
pub mod inventory;
pub mod persistence;
