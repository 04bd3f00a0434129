//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - estimate JSON and fitted/simulated series CSV (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
