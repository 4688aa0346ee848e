//! `Usuario` CRUD service.
//!
//! The crate is laid out hexagonally: [`domain`] holds the entity, the
//! result envelope, the transactional repository and the CRUD service,
//! [`inbound`] adapts HTTP onto the domain port and [`outbound`] provides
//! the PostgreSQL and in-memory stores.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use middleware::Trace;
