//! Explicit transaction handles and the scoped `in_transaction` helper.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::warn;

use crate::domain::DataAccessError;

/// Proof that a transaction was opened on a specific repository.
///
/// Handles are consumed by [`TransactionScope::commit`] and
/// [`TransactionScope::rollback`]. A handle whose transaction has already
/// been closed is stale and is rejected.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a transaction handle must be committed or rolled back"]
pub struct TransactionHandle {
    generation: u64,
}

impl TransactionHandle {
    pub(crate) const fn new(generation: u64) -> Self {
        Self { generation }
    }

    /// Sequence number of the transaction this handle belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Anything owning a single-active-transaction lifecycle.
#[async_trait]
pub trait TransactionScope: Send {
    /// Open a transaction, or return a handle to the one already open.
    async fn begin_transaction(&mut self) -> Result<TransactionHandle, DataAccessError>;

    /// Flush pending changes and make them durable.
    ///
    /// When flushing or committing fails the transaction is rolled back
    /// before the error is returned, so the handle is released either way.
    async fn commit(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError>;

    /// Discard pending changes and everything written since `begin`.
    async fn rollback(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError>;
}

/// Run `work` inside a transaction on `scope`.
///
/// Commits when `work` succeeds. When `work` fails the transaction is rolled
/// back before its error is returned; a failing rollback is logged and the
/// original error still wins.
///
/// # Errors
/// Returns the error raised by `begin`, `work` or `commit`.
///
/// # Examples
/// ```no_run
/// use futures_util::FutureExt;
/// use usuario_api::domain::repository::{in_transaction, UsuarioRepository};
/// use usuario_api::domain::Usuario;
/// use usuario_api::outbound::memory::InMemoryStore;
///
/// # async fn demo() -> Result<(), usuario_api::domain::DataAccessError> {
/// let store = InMemoryStore::<Usuario>::new();
/// let mut repo = UsuarioRepository::open(&store).await?;
/// let found = in_transaction(&mut repo, |repo| {
///     async move { repo.read_by_id(1).await }.boxed()
/// })
/// .await?;
/// assert!(found.is_none());
/// # Ok(())
/// # }
/// ```
pub async fn in_transaction<S, R, F>(scope: &mut S, work: F) -> Result<R, DataAccessError>
where
    S: TransactionScope,
    F: for<'s> FnOnce(&'s mut S) -> BoxFuture<'s, Result<R, DataAccessError>>,
{
    let handle = scope.begin_transaction().await?;
    match work(scope).await {
        Ok(value) => {
            scope.commit(handle).await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = scope.rollback(handle).await {
                warn!(%error, %rollback_error, "rollback after failed unit of work also failed");
            }
            Err(error)
        }
    }
}
