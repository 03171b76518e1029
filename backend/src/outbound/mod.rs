//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: mutex-guarded stores for tests and database-less runs
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//!
//! Adapters convert between domain types and storage representations. They
//! contain no business logic beyond the slot uniqueness the store enforces.

pub mod memory;
pub mod persistence;
