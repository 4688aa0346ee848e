//! In-process `EntityStore` used when no database is configured and by tests.
//!
//! Committed rows live behind a shared `tokio::sync::Mutex`. A transaction
//! works on a private copy of the rows and records its writes; commit
//! replays those writes onto the shared table under the lock, re-checking
//! uniqueness so a conflicting concurrent commit is rejected as a whole.
//! Keys come from a shared sequence and are never reused, including keys
//! handed out inside transactions that were rolled back.
//!
//! Faults can be armed for the next call of a given operation to exercise
//! failure paths: [`InMemoryStore::fail_next`] makes it return an error and
//! [`InMemoryStore::ignore_next`] makes a write report that it touched
//! nothing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::{EntityStore, StoreError, StoreSession};
use crate::domain::{Entity, Filter, SequentialKey};

/// Store operations a fault can be armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Begin,
    Commit,
    Rollback,
    Insert,
    Update,
    Delete,
    Query,
}

#[derive(Debug, Clone)]
enum Fault {
    Fail(String),
    Ignore,
}

type Rows<T> = BTreeMap<<T as Entity>::Key, T>;

struct Table<T: Entity> {
    rows: Rows<T>,
    next_key: Option<T::Key>,
    faults: HashMap<StoreOperation, Fault>,
}

/// Shared in-memory table of `T` rows.
///
/// # Examples
/// ```
/// use usuario_api::domain::ports::{EntityStore, StoreSession};
/// use usuario_api::domain::{Filter, Usuario};
/// use usuario_api::outbound::memory::InMemoryStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::<Usuario>::new();
/// let mut session = store.open().await.unwrap();
/// assert!(session.query(&Filter::all(), None).await.unwrap().is_empty());
/// # });
/// ```
pub struct InMemoryStore<T: Entity> {
    table: Arc<Mutex<Table<T>>>,
}

impl<T> InMemoryStore<T>
where
    T: Entity,
    T::Key: SequentialKey,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                rows: BTreeMap::new(),
                next_key: Some(T::Key::first()),
                faults: HashMap::new(),
            })),
        }
    }

    /// Make the next `operation` fail with a query error carrying `message`.
    pub async fn fail_next(&self, operation: StoreOperation, message: impl Into<String>) {
        let mut table = self.table.lock().await;
        table.faults.insert(operation, Fault::Fail(message.into()));
    }

    /// Make the next `operation` succeed without touching any row.
    ///
    /// Only meaningful for writes: an ignored insert yields `None`, an
    /// ignored update or delete reports zero affected rows.
    pub async fn ignore_next(&self, operation: StoreOperation) {
        let mut table = self.table.lock().await;
        table.faults.insert(operation, Fault::Ignore);
    }

    /// Committed rows ordered by key.
    pub async fn rows(&self) -> Vec<T> {
        self.table.lock().await.rows.values().cloned().collect()
    }
}

impl<T> Default for InMemoryStore<T>
where
    T: Entity,
    T::Key: SequentialKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

#[async_trait]
impl<T> EntityStore<T> for InMemoryStore<T>
where
    T: Entity,
    T::Key: SequentialKey,
{
    type Session = InMemorySession<T>;

    async fn open(&self) -> Result<Self::Session, StoreError> {
        Ok(InMemorySession {
            table: Arc::clone(&self.table),
            transaction: None,
        })
    }
}

enum Write<T: Entity> {
    Insert(T),
    Update(T),
    Delete(T::Key),
}

struct Transaction<T: Entity> {
    rows: Rows<T>,
    writes: Vec<Write<T>>,
}

/// One connection to an [`InMemoryStore`].
pub struct InMemorySession<T: Entity> {
    table: Arc<Mutex<Table<T>>>,
    transaction: Option<Transaction<T>>,
}

fn take_fault<T: Entity>(table: &mut Table<T>, operation: StoreOperation) -> Option<Fault> {
    let fault = table.faults.remove(&operation);
    if fault.is_some() {
        debug!(?operation, table = T::TABLE, "injected fault triggered");
    }
    fault
}

fn fail_on<T: Entity>(table: &mut Table<T>, operation: StoreOperation) -> Result<(), StoreError> {
    match take_fault(table, operation) {
        Some(Fault::Fail(message)) => Err(StoreError::query(message)),
        Some(Fault::Ignore) | None => Ok(()),
    }
}

fn check_unique<T: Entity>(rows: &Rows<T>, candidate: &T) -> Result<(), StoreError> {
    let wanted = candidate.unique_fields();
    for (key, row) in rows {
        if *key == candidate.key() {
            continue;
        }
        for (column, value) in row.unique_fields() {
            if wanted.iter().any(|(c, v)| *c == column && *v == value) {
                return Err(StoreError::constraint(format!(
                    "{}.{column} must be unique; {value:?} already exists",
                    T::TABLE
                )));
            }
        }
    }
    Ok(())
}

fn apply<T: Entity>(rows: &mut Rows<T>, write: &Write<T>) -> Result<u64, StoreError> {
    match write {
        Write::Insert(row) => {
            check_unique(rows, row)?;
            rows.insert(row.key(), row.clone());
            Ok(1)
        }
        Write::Update(row) => {
            if !rows.contains_key(&row.key()) {
                return Ok(0);
            }
            check_unique(rows, row)?;
            rows.insert(row.key(), row.clone());
            Ok(1)
        }
        Write::Delete(key) => Ok(u64::from(rows.remove(key).is_some())),
    }
}

impl<T> InMemorySession<T>
where
    T: Entity,
    T::Key: SequentialKey,
{
    /// Route `write` to the open transaction, or apply it to the shared
    /// table straight away.
    fn write(
        table: &mut Table<T>,
        transaction: Option<&mut Transaction<T>>,
        write: Write<T>,
    ) -> Result<u64, StoreError> {
        match transaction {
            Some(tx) => {
                let affected = apply(&mut tx.rows, &write)?;
                if affected > 0 {
                    tx.writes.push(write);
                }
                Ok(affected)
            }
            None => apply(&mut table.rows, &write),
        }
    }

    fn allocate_key(table: &mut Table<T>) -> Result<T::Key, StoreError> {
        let key = table
            .next_key
            .take()
            .ok_or_else(|| StoreError::query(format!("{} key space exhausted", T::TABLE)))?;
        table.next_key = key.successor();
        Ok(key)
    }
}

#[async_trait]
impl<T> StoreSession<T> for InMemorySession<T>
where
    T: Entity,
    T::Key: SequentialKey,
{
    async fn begin(&mut self) -> Result<(), StoreError> {
        if self.transaction.is_some() {
            return Err(StoreError::transaction("transaction already open"));
        }
        let mut table = self.table.lock().await;
        fail_on(&mut table, StoreOperation::Begin)?;
        self.transaction = Some(Transaction {
            rows: table.rows.clone(),
            writes: Vec::new(),
        });
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| StoreError::transaction("no transaction open"))?;
        let mut table = self.table.lock().await;
        fail_on(&mut table, StoreOperation::Commit)?;
        let mut rows = table.rows.clone();
        for write in &tx.writes {
            if apply(&mut rows, write)? == 0 {
                return Err(StoreError::transaction(format!(
                    "{} row changed by a concurrent commit",
                    T::TABLE
                )));
            }
        }
        table.rows = rows;
        debug!(table = T::TABLE, writes = tx.writes.len(), "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| StoreError::transaction("no transaction open"))?;
        let mut table = self.table.lock().await;
        fail_on(&mut table, StoreOperation::Rollback)?;
        debug!(table = T::TABLE, discarded = tx.writes.len(), "in-memory transaction rolled back");
        Ok(())
    }

    async fn insert(&mut self, entity: &T) -> Result<Option<T>, StoreError> {
        let mut table = self.table.lock().await;
        if let Some(fault) = take_fault(&mut table, StoreOperation::Insert) {
            return match fault {
                Fault::Fail(message) => Err(StoreError::query(message)),
                Fault::Ignore => Ok(None),
            };
        }
        entity.check_constraints().map_err(StoreError::constraint)?;
        let key = Self::allocate_key(&mut table)?;
        let row = entity.clone().with_key(key);
        Self::write(&mut table, self.transaction.as_mut(), Write::Insert(row.clone()))?;
        Ok(Some(row))
    }

    async fn update(&mut self, entity: &T) -> Result<u64, StoreError> {
        let mut table = self.table.lock().await;
        if let Some(fault) = take_fault(&mut table, StoreOperation::Update) {
            return match fault {
                Fault::Fail(message) => Err(StoreError::query(message)),
                Fault::Ignore => Ok(0),
            };
        }
        entity.check_constraints().map_err(StoreError::constraint)?;
        Self::write(&mut table, self.transaction.as_mut(), Write::Update(entity.clone()))
    }

    async fn delete(&mut self, key: &T::Key) -> Result<u64, StoreError> {
        let mut table = self.table.lock().await;
        if let Some(fault) = take_fault(&mut table, StoreOperation::Delete) {
            return match fault {
                Fault::Fail(message) => Err(StoreError::query(message)),
                Fault::Ignore => Ok(0),
            };
        }
        Self::write(&mut table, self.transaction.as_mut(), Write::Delete(key.clone()))
    }

    async fn query(
        &mut self,
        filter: &Filter<T>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let mut table = self.table.lock().await;
        fail_on(&mut table, StoreOperation::Query)?;
        let rows = self.transaction.as_ref().map_or(&table.rows, |tx| &tx.rows);
        let matching = rows.values().filter(|row| filter.matches(row)).cloned();
        Ok(match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}

impl<T: Entity> Drop for InMemorySession<T> {
    fn drop(&mut self) {
        if let Some(tx) = &self.transaction {
            warn!(
                table = T::TABLE,
                discarded = tx.writes.len(),
                "session dropped with an open transaction; writes discarded"
            );
        }
    }
}
