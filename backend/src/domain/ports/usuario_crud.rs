//! Driving port for `Usuario` CRUD operations.
//!
//! Every method reports its outcome through an [`OperationResult`]; failures
//! never surface as Rust errors past this boundary.

use async_trait::async_trait;

use crate::domain::{OperationResult, UpdateMode, UsuarioDto};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsuarioCrud: Send + Sync {
    /// Persist a new user. `None` models an absent request body.
    async fn create(&self, dto: Option<UsuarioDto>) -> OperationResult<UsuarioDto>;

    async fn get_by_id(&self, id: i32) -> OperationResult<UsuarioDto>;

    async fn get_all(&self) -> OperationResult<Vec<UsuarioDto>>;

    /// Merge `dto` into the stored user according to `mode`.
    async fn update(
        &self,
        id: i32,
        dto: Option<UsuarioDto>,
        mode: UpdateMode,
    ) -> OperationResult<UsuarioDto>;

    /// Remove a user. Successful results carry no payload.
    async fn delete(&self, id: i32) -> OperationResult<UsuarioDto>;

    /// Identity, name and email of one user.
    async fn get_summary_by_id(&self, id: i32) -> OperationResult<UsuarioDto>;

    async fn get_all_summaries(&self) -> OperationResult<Vec<UsuarioDto>>;
}
