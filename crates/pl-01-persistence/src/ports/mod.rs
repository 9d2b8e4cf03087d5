//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving port (`FarmStoreApi`, used by the state container
//!   and renderers)
//! - `outbound.rs` - Driven ports (byte-level storage, backend opening, time)

pub mod inbound;
pub mod outbound;
