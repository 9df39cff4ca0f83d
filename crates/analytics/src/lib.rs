//! # Karavan Analytics Engine
//!
//! This crate summarizes the item ledger into the figures the dashboard
//! shows: overall revenue/cost/profit totals, the top clients by revenue,
//! and a trailing six-month revenue/profit series.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless
//!   calculator. It takes already-fetched item and client snapshots as input
//!   and produces an `AnalyticsReport` as output. This makes it highly
//!   reliable and easy to test.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the main struct that contains the aggregation logic.
//! - `AnalyticsReport`: the standardized output (summary, top clients,
//!   monthly series).
//! - `DateRange`: the optional inclusive arrival-date filter.

pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, DateRange};
pub use report::{AnalyticsReport, MonthlyRevenue, Summary, TopClient};
