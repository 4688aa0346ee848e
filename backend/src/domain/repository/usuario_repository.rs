//! Typed repository for the `usuario` table.

use async_trait::async_trait;

use crate::domain::ports::EntityStore;
use crate::domain::{DataAccessError, Filter, Tracking, Usuario, UsuarioDto};

use super::generic::{GenericRepository, SaveReport};
use super::transaction::{TransactionHandle, TransactionScope};

/// `Usuario` operations layered on a [`GenericRepository`].
pub struct UsuarioRepository<S: EntityStore<Usuario>> {
    inner: GenericRepository<Usuario, S>,
}

impl<S: EntityStore<Usuario>> UsuarioRepository<S> {
    /// Open a repository on a fresh session of `store`.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when no session can be opened.
    pub async fn open(store: &S) -> Result<Self, DataAccessError> {
        Ok(Self {
            inner: GenericRepository::open(store).await?,
        })
    }

    pub async fn find_by_id(
        &mut self,
        id: i32,
        tracking: Tracking,
    ) -> Result<Option<Usuario>, DataAccessError> {
        self.inner.fetch_one(Some(Filter::by_key(id)), tracking).await
    }

    /// Read projection of one user; the password is never included.
    pub async fn read_by_id(&mut self, id: i32) -> Result<Option<UsuarioDto>, DataAccessError> {
        self.inner
            .project_one(Filter::by_key(id), &Usuario::read_projection())
            .await
    }

    pub async fn read_all(&mut self) -> Result<Vec<UsuarioDto>, DataAccessError> {
        self.inner
            .project_all(None, &Usuario::read_projection())
            .await
    }

    /// Identity, name and email of one user.
    pub async fn summary_by_id(&mut self, id: i32) -> Result<Option<UsuarioDto>, DataAccessError> {
        self.inner
            .project_one(Filter::by_key(id), &Usuario::summary_projection())
            .await
    }

    pub async fn all_summaries(&mut self) -> Result<Vec<UsuarioDto>, DataAccessError> {
        self.inner
            .project_all(None, &Usuario::summary_projection())
            .await
    }

    /// Insert a user built from `dto`, returning it with its generated id.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the row is rejected or
    /// nothing is persisted.
    pub async fn add_from_dto(&mut self, dto: &UsuarioDto) -> Result<Usuario, DataAccessError> {
        self.inner.create(Usuario::from_dto(dto)).await
    }

    /// Stage and flush an overwrite of `usuario`.
    ///
    /// # Errors
    /// Returns [`DataAccessError::NotFound`] when the row vanished.
    pub async fn update(&mut self, usuario: Usuario) -> Result<SaveReport<Usuario>, DataAccessError> {
        self.inner.update(usuario);
        self.save().await
    }

    /// # Errors
    /// Returns [`DataAccessError::NotFound`] when the row vanished.
    pub async fn remove(&mut self, usuario: &Usuario) -> Result<(), DataAccessError> {
        self.inner.remove(usuario).await
    }

    /// Flush whatever is staged; a no-op report when nothing is.
    ///
    /// # Errors
    /// Propagates flush failures from [`GenericRepository::save`].
    pub async fn save(&mut self) -> Result<SaveReport<Usuario>, DataAccessError> {
        self.inner.save().await
    }
}

#[async_trait]
impl<S: EntityStore<Usuario>> TransactionScope for UsuarioRepository<S> {
    async fn begin_transaction(&mut self) -> Result<TransactionHandle, DataAccessError> {
        self.inner.begin_transaction().await
    }

    async fn commit(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError> {
        self.inner.commit(handle).await
    }

    async fn rollback(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError> {
        self.inner.rollback(handle).await
    }
}
