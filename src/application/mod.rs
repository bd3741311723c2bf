//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain types and manages runtime behavior:
//! - Dedupe filter (admit/reject decisions over a seen set)
//! - Expiry sweeper (background reclamation of expired keys)
//! - Metrics
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod filter;
pub mod metrics;
pub mod ports;
pub mod sweeper;
