//! # Domain Layer
//!
//! - `state` - The state record, partial updates, save outcomes
//! - `screens` - Screen identifiers and their payloads
//! - `analytics` - KPIs, charts, reports and graded metrics
//! - `errors` - Error types

pub mod analytics;
pub mod errors;
pub mod screens;
pub mod state;
