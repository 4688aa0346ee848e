//! `Usuario` CRUD orchestration.
//!
//! Implements the [`UsuarioCrud`] driving port on top of any
//! [`EntityStore<Usuario>`]. Every call opens its own repository, so each
//! write runs in a transaction scoped to that single call. Repository errors
//! are folded into [`OperationResult`] values here and go no further.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, error};

use crate::domain::ports::{EntityStore, UsuarioCrud};
use crate::domain::repository::{UsuarioRepository, in_transaction};
use crate::domain::{
    DataAccessError, Entity, OperationResult, ResponseCode, Tracking, UpdateMode, Usuario,
    UsuarioDto,
};

const EMPTY_PAYLOAD: &str = "No se puede cargar un dato vacío en la base de datos";
const EMPTY_UPDATE: &str = "No se puede actualizar con un dato vacío";
const INVALID_PAYLOAD: &str = "Los datos del usuario no son válidos";
const SAVED: &str = "El registro se ha guardado satisfactoriamente";
const SAVE_FAILED: &str = "No se ha podido guardar correctamente la información";
const NOT_FOUND: &str = "Usuario no encontrado.";
const FOUND: &str = "Usuario encontrado exitosamente.";
const FETCH_ONE_FAILED: &str = "Ocurrió un error al intentar obtener el usuario.";
const NONE_FOUND: &str = "No se encontraron usuarios.";
const FOUND_MANY: &str = "Usuarios obtenidos exitosamente.";
const FETCH_ALL_FAILED: &str = "Ocurrió un error al intentar obtener los usuarios.";
const UPDATED: &str = "Usuario actualizado exitosamente.";
const UPDATE_FAILED: &str = "Error al actualizar el usuario.";
const DELETED: &str = "El usuario ha sido eliminado correctamente.";
const DELETE_FAILED: &str = "Error al eliminar el usuario.";

/// Lifecycle of a single write operation.
///
/// `Started → Validated → Persisted | Failed → Completed`, with the shortcut
/// `Started → Failed` for payloads rejected before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudStage {
    Started,
    Validated,
    Persisted,
    Failed,
    Completed,
}

impl CrudStage {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Started, Self::Validated | Self::Failed)
                | (Self::Validated, Self::Persisted | Self::Failed)
                | (Self::Persisted | Self::Failed, Self::Completed)
        )
    }
}

impl fmt::Display for CrudStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Validated => "validated",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Stage tracker for one operation; illegal transitions are refused and logged.
#[derive(Debug)]
struct Progress {
    operation: &'static str,
    stage: CrudStage,
}

impl Progress {
    fn start(operation: &'static str) -> Self {
        debug!(operation, stage = %CrudStage::Started, "crud stage");
        Self {
            operation,
            stage: CrudStage::Started,
        }
    }

    fn advance(&mut self, next: CrudStage) {
        if !self.stage.can_advance_to(next) {
            error!(
                operation = self.operation,
                from = %self.stage,
                to = %next,
                "illegal crud stage transition refused"
            );
            return;
        }
        debug!(operation = self.operation, from = %self.stage, to = %next, "crud stage");
        self.stage = next;
    }

    /// Record the outcome and close the operation.
    fn finish<T>(mut self, result: OperationResult<T>) -> OperationResult<T> {
        let outcome = if result.is_success() {
            CrudStage::Persisted
        } else {
            CrudStage::Failed
        };
        self.advance(outcome);
        self.advance(CrudStage::Completed);
        result
    }
}

/// Reject an absent or rule-breaking payload before any store access.
fn validated(
    dto: Option<UsuarioDto>,
    mode: UpdateMode,
    empty: &str,
) -> Result<UsuarioDto, DataAccessError> {
    let dto = dto.ok_or_else(|| DataAccessError::validation(empty))?;
    dto.check(mode)
        .map_err(|rule| DataAccessError::validation(format!("{INVALID_PAYLOAD}: {rule}")))?;
    Ok(dto)
}

fn rejected<T>(error: DataAccessError) -> OperationResult<T> {
    debug!(%error, "usuario payload rejected");
    let code = error.response_code();
    let message = match error {
        DataAccessError::Validation { message } => message,
        other => other.to_string(),
    };
    OperationResult::error(code, message)
}

fn failure<T>(message: &str, error: &DataAccessError) -> OperationResult<T> {
    error!(%error, message, "usuario operation failed");
    OperationResult::error_with(
        ResponseCode::InternalServerError,
        message,
        vec![error.to_string()],
    )
}

/// `UsuarioCrud` implementation backed by a store of `S`.
pub struct UsuarioCrudService<S> {
    store: Arc<S>,
}

impl<S> Clone for UsuarioCrudService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> UsuarioCrudService<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: EntityStore<Usuario>> UsuarioCrudService<S> {
    async fn repository(&self) -> Result<UsuarioRepository<S>, DataAccessError> {
        UsuarioRepository::open(self.store.as_ref()).await
    }

    async fn insert(&self, dto: UsuarioDto) -> Result<Usuario, DataAccessError> {
        let mut repo = self.repository().await?;
        in_transaction(&mut repo, |repo| {
            async move { repo.add_from_dto(&dto).await }.boxed()
        })
        .await
    }

    async fn modify(
        &self,
        id: i32,
        dto: UsuarioDto,
        mode: UpdateMode,
    ) -> Result<Usuario, DataAccessError> {
        let mut repo = self.repository().await?;
        in_transaction(&mut repo, |repo| {
            async move {
                let mut usuario = repo
                    .find_by_id(id, Tracking::Tracked)
                    .await?
                    .ok_or_else(|| DataAccessError::not_found(Usuario::TABLE))?;
                usuario.apply(&dto, mode);
                repo.update(usuario.clone()).await?;
                Ok::<_, DataAccessError>(usuario)
            }
            .boxed()
        })
        .await
    }

    async fn erase(&self, id: i32) -> Result<(), DataAccessError> {
        let mut repo = self.repository().await?;
        in_transaction(&mut repo, |repo| {
            async move {
                let usuario = repo
                    .find_by_id(id, Tracking::Untracked)
                    .await?
                    .ok_or_else(|| DataAccessError::not_found(Usuario::TABLE))?;
                repo.remove(&usuario).await
            }
            .boxed()
        })
        .await
    }

    fn single(
        found: Result<Option<UsuarioDto>, DataAccessError>,
    ) -> OperationResult<UsuarioDto> {
        match found {
            Ok(Some(dto)) => OperationResult::success(dto, FOUND),
            Ok(None) => OperationResult::error(ResponseCode::NotFound, NOT_FOUND),
            Err(error) => failure(FETCH_ONE_FAILED, &error),
        }
    }

    fn many(found: Result<Vec<UsuarioDto>, DataAccessError>) -> OperationResult<Vec<UsuarioDto>> {
        match found {
            Ok(list) if list.is_empty() => {
                OperationResult::error(ResponseCode::NotFound, NONE_FOUND)
            }
            Ok(list) => OperationResult::success(list, FOUND_MANY),
            Err(error) => failure(FETCH_ALL_FAILED, &error),
        }
    }
}

#[async_trait]
impl<S: EntityStore<Usuario>> UsuarioCrud for UsuarioCrudService<S> {
    async fn create(&self, dto: Option<UsuarioDto>) -> OperationResult<UsuarioDto> {
        let mut progress = Progress::start("create");
        let dto = match validated(dto, UpdateMode::Full, EMPTY_PAYLOAD) {
            Ok(dto) => dto,
            Err(error) => return progress.finish(rejected(error)),
        };
        progress.advance(CrudStage::Validated);

        let result = match self.insert(dto.clone()).await {
            Ok(saved) => OperationResult::created(
                UsuarioDto {
                    id_usuario: saved.id_usuario,
                    contrasena: None,
                    ..dto
                },
                SAVED,
            ),
            Err(error) => failure(SAVE_FAILED, &error),
        };
        progress.finish(result)
    }

    async fn get_by_id(&self, id: i32) -> OperationResult<UsuarioDto> {
        let found = match self.repository().await {
            Ok(mut repo) => repo.read_by_id(id).await,
            Err(error) => Err(error),
        };
        Self::single(found)
    }

    async fn get_all(&self) -> OperationResult<Vec<UsuarioDto>> {
        let found = match self.repository().await {
            Ok(mut repo) => repo.read_all().await,
            Err(error) => Err(error),
        };
        Self::many(found)
    }

    async fn update(
        &self,
        id: i32,
        dto: Option<UsuarioDto>,
        mode: UpdateMode,
    ) -> OperationResult<UsuarioDto> {
        let mut progress = Progress::start("update");
        let dto = match validated(dto, mode, EMPTY_UPDATE) {
            Ok(dto) => dto,
            Err(error) => return progress.finish(rejected(error)),
        };
        progress.advance(CrudStage::Validated);

        let result = match self.modify(id, dto, mode).await {
            Ok(usuario) => {
                OperationResult::success(Usuario::read_projection().apply(&usuario), UPDATED)
            }
            Err(DataAccessError::NotFound { .. }) => {
                OperationResult::error(ResponseCode::NotFound, NOT_FOUND)
            }
            Err(error) => failure(UPDATE_FAILED, &error),
        };
        progress.finish(result)
    }

    async fn delete(&self, id: i32) -> OperationResult<UsuarioDto> {
        let mut progress = Progress::start("delete");
        progress.advance(CrudStage::Validated);

        let result = match self.erase(id).await {
            Ok(()) => OperationResult::success_without_data(DELETED),
            Err(DataAccessError::NotFound { .. }) => {
                OperationResult::error(ResponseCode::NotFound, NOT_FOUND)
            }
            Err(error) => failure(DELETE_FAILED, &error),
        };
        progress.finish(result)
    }

    async fn get_summary_by_id(&self, id: i32) -> OperationResult<UsuarioDto> {
        let found = match self.repository().await {
            Ok(mut repo) => repo.summary_by_id(id).await,
            Err(error) => Err(error),
        };
        Self::single(found)
    }

    async fn get_all_summaries(&self) -> OperationResult<Vec<UsuarioDto>> {
        let found = match self.repository().await {
            Ok(mut repo) => repo.all_summaries().await,
            Err(error) => Err(error),
        };
        Self::many(found)
    }
}

#[cfg(test)]
#[path = "crud_service_tests.rs"]
mod tests;
