//! # Domain Layer
//!
//! Pure logic for the farm document store. No I/O happens here.
//!
//! ## Modules
//!
//! - `errors` - Store and backend error types
//! - `keyspace` - Byte layout of records, index entries and metadata
//! - `query` - Key extraction and primary-key filtering
//! - `summaries` - Aggregate figures (finance, inventory, flocks, quality)
//! - `validation` - Write-time record checks and strict decoding

pub mod errors;
pub mod keyspace;
pub mod query;
pub mod summaries;
pub mod validation;
