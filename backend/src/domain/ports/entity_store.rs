//! Port for entity storage with explicit transactions.
//!
//! An [`EntityStore`] hands out [`StoreSession`]s. A session owns one
//! logical connection; writes issued between `begin` and `commit` become
//! visible to other sessions only once committed, and are discarded on
//! `rollback` or when the session is dropped mid-transaction.

use async_trait::async_trait;

use crate::domain::{Entity, Filter, Projection};

use super::define_port_error;

define_port_error! {
    /// Errors raised by entity store adapters.
    pub enum StoreError {
        /// Connection could not be established or checked out.
        Connection { message: String } => "store connection failed: {message}",
        /// A table constraint (uniqueness, length, nullability) rejected the write.
        Constraint { message: String } => "store constraint violated: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// Transaction bookkeeping failed (begin, commit or rollback).
        Transaction { message: String } => "store transaction failed: {message}",
    }
}

/// One logical connection to the backing store.
#[async_trait]
pub trait StoreSession<T: Entity>: Send {
    /// Open a transaction on this session.
    async fn begin(&mut self) -> Result<(), StoreError>;

    /// Make every write since [`begin`](Self::begin) durable.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard every write since [`begin`](Self::begin).
    async fn rollback(&mut self) -> Result<(), StoreError>;

    /// Insert `entity`, returning the stored row with its generated key.
    ///
    /// `Ok(None)` means the store accepted the statement but persisted nothing.
    async fn insert(&mut self, entity: &T) -> Result<Option<T>, StoreError>;

    /// Overwrite the row identified by `entity.key()`. Returns rows affected.
    async fn update(&mut self, entity: &T) -> Result<u64, StoreError>;

    /// Delete the row identified by `key`. Returns rows affected.
    async fn delete(&mut self, key: &T::Key) -> Result<u64, StoreError>;

    /// Rows matching `filter`, ordered by key, at most `limit` of them.
    async fn query(&mut self, filter: &Filter<T>, limit: Option<usize>)
    -> Result<Vec<T>, StoreError>;

    /// Like [`query`](Self::query) but yields the projected shape of each row.
    async fn project<P>(
        &mut self,
        filter: &Filter<T>,
        projection: &Projection<T, P>,
        limit: Option<usize>,
    ) -> Result<Vec<P>, StoreError>
    where
        P: Send + 'static,
    {
        let rows = self.query(filter, limit).await?;
        Ok(rows.iter().map(|row| projection.apply(row)).collect())
    }
}

/// Factory for store sessions.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    type Session: StoreSession<T>;

    /// Open a new session.
    async fn open(&self) -> Result<Self::Session, StoreError>;
}
