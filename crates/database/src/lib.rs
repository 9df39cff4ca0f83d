//! # Karavan Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the system's "permanent archive" of clients,
//! consigned items, exchange rates, and accounts.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate is an adapter that encapsulates all
//!   database-specific logic. It provides a clean, abstract API to the rest
//!   of the application, hiding the underlying SQL.
//! - **Capability Object:** All access goes through a `DbRepository` handle
//!   that is constructed once and passed where needed; nothing in the
//!   workspace reaches for a process-wide connection.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses
//!   a connection pool (`PgPool`) for concurrent access.
//!
//! ## Public API
//!
//! - `connect`: the async function to establish the database connection pool.
//! - `run_migrations`: a utility to apply database migrations, ensuring the
//!   schema is up-to-date.
//! - `DbRepository`: the main struct that holds the connection pool and
//!   provides all the high-level data access methods.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{ClientDetail, ClientOverview, ClientSummary, DbRepository, ItemWithClient};
