//! Discovery summary types and helpers.

mod discovery_summary;
mod outcome;

pub use discovery_summary::DiscoverySummary;
pub use outcome::QueryOutcome;
