//! VTEC event reconciliation engine
//!
//! Consumes assembled text products and reconciles each VTEC code against a
//! persisted event through a repository collaborator:
//! - [`repository`] - the persistence contract and the in-process implementation
//! - [`postgres`] - the PostgreSQL implementation
//! - [`reconciler`] - the action-driven state machine

pub mod postgres;
pub mod reconciler;
pub mod repository;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use postgres::PostgresRepository;
pub use reconciler::VtecReconciler;
pub use repository::{EventRepository, MemoryRepository};
