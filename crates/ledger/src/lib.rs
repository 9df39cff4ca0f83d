//! # Karavan Ledger Derivation
//!
//! This crate fills in the computed monetary fields of an item record. It is
//! the "bookkeeper" of the system: given whatever figures a request supplied,
//! it derives the KZT amount from the USD price and exchange rate, and the
//! margin from the KZT amount and cost price.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and depends only on `core-types` (Layer 0).
//! - **Deterministic Arithmetic:** The derivation is plain IEEE-754 double
//!   arithmetic with no rounding, so the stored figures are bit-exact with
//!   respect to the inputs.
//!
//! ## Public API
//!
//! - `derive`: the single entry point, applied identically on item create
//!   and update.

pub mod derivation;

pub use derivation::derive;
