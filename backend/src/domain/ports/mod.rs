//! Domain ports defining the edges of the hexagon.
//!
//! Driven adapters (databases, in-memory stores) implement
//! [`EntityStore`]; driving adapters (HTTP) call [`UsuarioCrud`].

mod macros;
pub(crate) use macros::define_port_error;

mod entity_store;
mod usuario_crud;

pub use entity_store::{EntityStore, StoreError, StoreSession};
#[cfg(test)]
pub use usuario_crud::MockUsuarioCrud;
pub use usuario_crud::UsuarioCrud;
