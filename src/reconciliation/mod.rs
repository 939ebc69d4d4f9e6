//! Reconciliation of bank statements against recorded transactions

pub mod amount;
pub mod dates;
pub mod reconciler;
pub mod statement;

pub use dates::DateWindowMatcher;
pub use reconciler::*;
pub use statement::*;
