//! PostgreSQL persistence adapter using Diesel.
//!
//! Row structs (`models.rs`) and the table definition (`schema.rs`) are
//! internal; only the store, its session and the pool are exported.
//!
//! # Example
//!
//! ```no_run
//! use usuario_api::outbound::persistence::{DbPool, DieselUsuarioStore, PoolConfig};
//!
//! # async fn demo() -> Result<(), usuario_api::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/usuarios")).await?;
//! let store = DieselUsuarioStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_usuario_store;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_usuario_store::{DieselUsuarioSession, DieselUsuarioStore};
pub use pool::{DbPool, PoolConfig, PoolError};
