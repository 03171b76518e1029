//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use clinic_backend::outbound::persistence::{
//!     DbPool, DieselAppointmentRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! run_pending_migrations("postgres://localhost/clinic").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let repo = DieselAppointmentRepository::new(pool);
//! ```

mod diesel_admin_session_repository;
mod diesel_appointment_repository;
mod diesel_basic_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_session_repository::DieselAdminSessionRepository;
pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
