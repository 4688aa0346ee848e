//! PostgreSQL-backed `EntityStore<Usuario>` using Diesel.
//!
//! Each session checks out one pooled connection and keeps it until dropped,
//! so `begin`, the writes and `commit` all run on the same connection.
//! Transactions are driven through diesel-async's `AnsiTransactionManager`.
//! A key hint on the filter is pushed down as a `WHERE id_usuario = $1`;
//! any predicate is then applied in process.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, RunQueryDsl, TransactionManager};
use tracing::{debug, warn};

use crate::domain::ports::{EntityStore, StoreError, StoreSession};
use crate::domain::{Entity, Filter, Usuario};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUsuarioRow, UsuarioChangeset, UsuarioRow};
use super::pool::{DbPool, OwnedConnection};
use super::schema::usuario;

/// Diesel-backed store for the `usuario` table.
#[derive(Clone)]
pub struct DieselUsuarioStore {
    pool: DbPool,
}

impl DieselUsuarioStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Usuario> for DieselUsuarioStore {
    type Session = DieselUsuarioSession;

    async fn open(&self) -> Result<Self::Session, StoreError> {
        let conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        Ok(DieselUsuarioSession {
            conn,
            in_transaction: false,
        })
    }
}

/// One pooled connection to the `usuario` table.
pub struct DieselUsuarioSession {
    conn: OwnedConnection,
    in_transaction: bool,
}

fn affected(count: usize) -> Result<u64, StoreError> {
    u64::try_from(count).map_err(|_| StoreError::query("affected row count overflow"))
}

#[async_trait]
impl StoreSession<Usuario> for DieselUsuarioSession {
    async fn begin(&mut self) -> Result<(), StoreError> {
        AnsiTransactionManager::begin_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let outcome = AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error);
        self.in_transaction = false;
        outcome
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let outcome = AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error);
        self.in_transaction = false;
        outcome
    }

    async fn insert(&mut self, entity: &Usuario) -> Result<Option<Usuario>, StoreError> {
        entity.check_constraints().map_err(StoreError::constraint)?;
        let row = diesel::insert_into(usuario::table)
            .values(NewUsuarioRow::from(entity))
            .returning(UsuarioRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        debug!(inserted = row.is_some(), "usuario insert executed");
        Ok(row.map(Usuario::from))
    }

    async fn update(&mut self, entity: &Usuario) -> Result<u64, StoreError> {
        entity.check_constraints().map_err(StoreError::constraint)?;
        let count = diesel::update(usuario::table.find(entity.key()))
            .set(UsuarioChangeset::from(entity))
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        affected(count)
    }

    async fn delete(&mut self, key: &i32) -> Result<u64, StoreError> {
        let count = diesel::delete(usuario::table.find(*key))
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        affected(count)
    }

    async fn query(
        &mut self,
        filter: &Filter<Usuario>,
        limit: Option<usize>,
    ) -> Result<Vec<Usuario>, StoreError> {
        let mut statement = usuario::table
            .select(UsuarioRow::as_select())
            .order(usuario::id_usuario.asc())
            .into_boxed();
        if let Some(id) = filter.key_hint() {
            statement = statement.filter(usuario::id_usuario.eq(*id));
        }
        if let (Some(limit), false) = (limit, filter.has_predicate()) {
            statement = statement.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows: Vec<UsuarioRow> = statement
            .load(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;

        let matching = rows
            .into_iter()
            .map(Usuario::from)
            .filter(|u| filter.matches(u));
        Ok(match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}

impl Drop for DieselUsuarioSession {
    fn drop(&mut self) {
        if self.in_transaction {
            // The pool discards connections left mid-transaction, which rolls
            // the transaction back server-side.
            warn!("usuario session dropped with an open transaction");
        }
    }
}
