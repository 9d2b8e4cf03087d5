//! # Poultry-Ledger Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Store throughput (criterion)
//! └── src/integration/  # Store, state container and runtime together
//!     ├── inventory.rs   # Stock properties over random inputs
//!     ├── persistence.rs # File-backed store, backup and restore
//!     └── flows.rs       # State container and runtime end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pl-tests
//! cargo test -p pl-tests integration::inventory::
//! cargo bench -p pl-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
