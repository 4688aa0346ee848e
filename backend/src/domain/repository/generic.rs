//! Unit-of-work repository over a single [`StoreSession`].
//!
//! Writes are staged and flushed by [`GenericRepository::save`]. Outside an
//! explicit transaction `save` opens and commits an implicit one, so callers
//! never observe a half-applied flush. Tracked fetches keep a snapshot of
//! each row; updating a row to a value equal to its snapshot stages nothing.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{EntityStore, StoreSession};
use crate::domain::{DataAccessError, Entity, Filter, Projection, Tracking};

use super::transaction::{TransactionHandle, TransactionScope};

#[derive(Debug)]
enum PendingChange<T: Entity> {
    Insert(T),
    Update(T),
    Delete(T::Key),
}

/// Outcome of flushing the pending changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport<T> {
    /// Rows touched by the flush.
    pub affected: u64,
    /// Rows inserted by the flush, carrying their generated keys.
    pub inserted: Vec<T>,
}

impl<T> Default for SaveReport<T> {
    fn default() -> Self {
        Self {
            affected: 0,
            inserted: Vec::new(),
        }
    }
}

/// Repository for any table-backed [`Entity`].
///
/// One instance owns one store session and at most one open transaction.
/// Instances are not shared between requests.
pub struct GenericRepository<T: Entity, S: EntityStore<T>> {
    session: S::Session,
    pending: Vec<PendingChange<T>>,
    tracked: HashMap<T::Key, T>,
    transaction: Option<u64>,
    generation: u64,
}

impl<T: Entity, S: EntityStore<T>> GenericRepository<T, S> {
    /// Open a repository on a fresh session of `store`.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when no session can be opened.
    pub async fn open(store: &S) -> Result<Self, DataAccessError> {
        let session = store.open().await?;
        Ok(Self {
            session,
            pending: Vec::new(),
            tracked: HashMap::new(),
            transaction: None,
            generation: 0,
        })
    }

    /// Stage `entity` for insertion.
    pub fn add(&mut self, entity: T) {
        self.pending.push(PendingChange::Insert(entity));
    }

    /// Stage an overwrite of the row identified by `entity.key()`.
    ///
    /// Nothing is staged when `entity` equals its tracked snapshot.
    pub fn update(&mut self, entity: T) {
        if self.tracked.get(&entity.key()) == Some(&entity) {
            debug!(table = T::TABLE, key = %entity.key(), "update skipped; entity unchanged");
            return;
        }
        self.pending.push(PendingChange::Update(entity));
    }

    /// Insert `entity` and return the persisted row.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the store rejects the
    /// write or persists nothing.
    pub async fn create(&mut self, entity: T) -> Result<T, DataAccessError> {
        self.add(entity);
        let report = self.save().await?;
        report.inserted.into_iter().next().ok_or_else(|| {
            DataAccessError::persistence(format!("insert into {} affected no rows", T::TABLE))
        })
    }

    /// Delete the row backing `entity`.
    ///
    /// # Errors
    /// Returns [`DataAccessError::NotFound`] when the row no longer exists.
    pub async fn remove(&mut self, entity: &T) -> Result<(), DataAccessError> {
        self.pending.push(PendingChange::Delete(entity.key()));
        self.save().await.map(|_| ())
    }

    /// Flush every staged change in order.
    ///
    /// # Errors
    /// Returns [`DataAccessError::NotFound`] when an update or delete touches
    /// no row, or [`DataAccessError::Persistence`] when the store fails. The
    /// pending queue is emptied either way.
    pub async fn save(&mut self) -> Result<SaveReport<T>, DataAccessError> {
        if self.pending.is_empty() {
            return Ok(SaveReport::default());
        }
        if self.transaction.is_some() {
            return self.flush().await;
        }

        if let Err(error) = self.session.begin().await {
            self.pending.clear();
            return Err(error.into());
        }
        match self.flush().await {
            Ok(report) => match self.session.commit().await {
                Ok(()) => Ok(report),
                Err(error) => {
                    self.tracked.clear();
                    self.rollback_session().await;
                    Err(error.into())
                }
            },
            Err(error) => {
                self.tracked.clear();
                self.rollback_session().await;
                Err(error)
            }
        }
    }

    async fn flush(&mut self) -> Result<SaveReport<T>, DataAccessError> {
        let mut report = SaveReport::default();
        for change in std::mem::take(&mut self.pending) {
            match change {
                PendingChange::Insert(entity) => {
                    let Some(row) = self.session.insert(&entity).await? else {
                        debug!(table = T::TABLE, "insert accepted but nothing persisted");
                        continue;
                    };
                    report.affected += 1;
                    self.tracked.insert(row.key(), row.clone());
                    report.inserted.push(row);
                }
                PendingChange::Update(entity) => {
                    let affected = self.session.update(&entity).await?;
                    if affected == 0 {
                        return Err(DataAccessError::not_found(T::TABLE));
                    }
                    report.affected += affected;
                    self.tracked.insert(entity.key(), entity);
                }
                PendingChange::Delete(key) => {
                    let affected = self.session.delete(&key).await?;
                    if affected == 0 {
                        return Err(DataAccessError::not_found(T::TABLE));
                    }
                    report.affected += affected;
                    self.tracked.remove(&key);
                }
            }
        }
        debug!(table = T::TABLE, affected = report.affected, "changes flushed");
        Ok(report)
    }

    async fn rollback_session(&mut self) {
        if let Err(error) = self.session.rollback().await {
            warn!(table = T::TABLE, %error, "rollback failed");
        }
    }

    /// At most one row matching `filter` (every row when `None`).
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the query fails.
    pub async fn fetch_one(
        &mut self,
        filter: Option<Filter<T>>,
        tracking: Tracking,
    ) -> Result<Option<T>, DataAccessError> {
        let rows = self
            .session
            .query(&filter.unwrap_or_default(), Some(1))
            .await?;
        let row = rows.into_iter().next();
        if let (Some(found), Tracking::Tracked) = (&row, tracking) {
            self.tracked.insert(found.key(), found.clone());
        }
        Ok(row)
    }

    /// Every row matching `filter`, tracked. Empty when nothing matches.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the query fails.
    pub async fn fetch_all(&mut self, filter: Option<Filter<T>>) -> Result<Vec<T>, DataAccessError> {
        let rows = self.session.query(&filter.unwrap_or_default(), None).await?;
        for row in &rows {
            self.tracked.insert(row.key(), row.clone());
        }
        Ok(rows)
    }

    /// Projected shape of at most one row matching `filter`. Never tracked.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the query fails.
    pub async fn project_one<P>(
        &mut self,
        filter: Filter<T>,
        projection: &Projection<T, P>,
    ) -> Result<Option<P>, DataAccessError>
    where
        P: Send + 'static,
    {
        let rows = self.session.project(&filter, projection, Some(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Projected shape of every row matching `filter`. Never tracked.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Persistence`] when the query fails.
    pub async fn project_all<P>(
        &mut self,
        filter: Option<Filter<T>>,
        projection: &Projection<T, P>,
    ) -> Result<Vec<P>, DataAccessError>
    where
        P: Send + 'static,
    {
        let rows = self
            .session
            .project(&filter.unwrap_or_default(), projection, None)
            .await?;
        Ok(rows)
    }

    /// Whether a snapshot of the row keyed `key` is held.
    #[must_use]
    pub fn is_tracked(&self, key: &T::Key) -> bool {
        self.tracked.contains_key(key)
    }

    /// Whether staged changes are waiting for [`save`](Self::save).
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub const fn has_open_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn release(&mut self, handle: &TransactionHandle) -> Result<(), DataAccessError> {
        match self.transaction {
            None => Err(DataAccessError::transaction_state("no transaction is open")),
            Some(open) if open != handle.generation() => Err(DataAccessError::transaction_state(
                format!("handle {} is stale; transaction {open} is open", handle.generation()),
            )),
            Some(_) => {
                self.transaction = None;
                Ok(())
            }
        }
    }

    fn discard(&mut self) {
        self.pending.clear();
        self.tracked.clear();
    }
}

#[async_trait]
impl<T: Entity, S: EntityStore<T>> TransactionScope for GenericRepository<T, S> {
    async fn begin_transaction(&mut self) -> Result<TransactionHandle, DataAccessError> {
        if let Some(open) = self.transaction {
            debug!(table = T::TABLE, generation = open, "transaction already open; reusing");
            return Ok(TransactionHandle::new(open));
        }
        self.session.begin().await?;
        self.generation += 1;
        self.transaction = Some(self.generation);
        debug!(table = T::TABLE, generation = self.generation, "transaction opened");
        Ok(TransactionHandle::new(self.generation))
    }

    async fn commit(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError> {
        self.release(&handle)?;
        let outcome = match self.flush().await {
            Ok(_) => self.session.commit().await.map_err(DataAccessError::from),
            Err(error) => Err(error),
        };
        if let Err(error) = outcome {
            warn!(table = T::TABLE, %error, "commit failed; rolling back");
            self.discard();
            self.rollback_session().await;
            return Err(error);
        }
        debug!(table = T::TABLE, generation = handle.generation(), "transaction committed");
        Ok(())
    }

    async fn rollback(&mut self, handle: TransactionHandle) -> Result<(), DataAccessError> {
        self.release(&handle)?;
        self.discard();
        warn!(table = T::TABLE, generation = handle.generation(), "transaction rolled back");
        self.session.rollback().await?;
        Ok(())
    }
}
