//! Data-access layer: a generic unit-of-work repository, its transaction
//! handles and the `Usuario` repository composed on top of it.

mod generic;
mod transaction;
mod usuario_repository;

pub use generic::{GenericRepository, SaveReport};
pub use transaction::{TransactionHandle, TransactionScope, in_transaction};
pub use usuario_repository::UsuarioRepository;
