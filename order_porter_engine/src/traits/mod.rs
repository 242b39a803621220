//! # Seams
//!
//! The engine talks to the vendor only through [`OrderSource`]. The live implementation is
//! [`vivid_tools::VividApi`]; tests substitute a `mockall` mock.
mod order_source;

pub use order_source::{source_from_config, OrderSource, Unauthenticated};
