//! Entity abstraction plus the filter and projection values repositories accept.
//!
//! Filters and projections are plain closures wrapped in cheap-to-clone
//! handles. A filter may also carry a primary-key hint so SQL adapters can
//! narrow the query; the predicate remains authoritative either way.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A persisted record with a stable store-generated identity.
pub trait Entity: Clone + PartialEq + Send + Sync + fmt::Debug + 'static {
    /// Primary key type.
    type Key: Clone + Eq + Ord + Hash + Send + Sync + fmt::Debug + fmt::Display + 'static;

    /// Table backing the entity; used in logs and error messages.
    const TABLE: &'static str;

    /// Current identity. Transient entities report their unset placeholder.
    fn key(&self) -> Self::Key;

    /// Copy of the entity carrying `key` as its identity.
    #[must_use]
    fn with_key(self, key: Self::Key) -> Self;

    /// Column/value pairs that must be unique across the table.
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Column rules of the backing table (required values, maximum lengths).
    ///
    /// # Errors
    /// Returns a description of the first violated rule.
    fn check_constraints(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Keys a store can generate sequentially.
pub trait SequentialKey: Sized {
    /// Key handed to the first inserted row.
    fn first() -> Self;

    /// Key following `self`, or `None` once the key space is exhausted.
    fn successor(&self) -> Option<Self>;
}

impl SequentialKey for i32 {
    fn first() -> Self {
        1
    }

    fn successor(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl SequentialKey for i64 {
    fn first() -> Self {
        1
    }

    fn successor(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

/// Whether a fetched entity is registered for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    /// Snapshot the entity so later updates can be diffed.
    #[default]
    Tracked,
    /// Read-only fetch; returns the same data without the snapshot.
    Untracked,
}

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Composable predicate over entities of type `T`.
///
/// # Examples
/// ```
/// use usuario_api::domain::{Filter, Usuario};
///
/// let filter = Filter::<Usuario>::by_key(7)
///     .and(Filter::matching(|u: &Usuario| u.correo.ends_with("@x.com")));
/// assert_eq!(filter.key_hint(), Some(&7));
/// ```
pub struct Filter<T: Entity> {
    key: Option<T::Key>,
    predicate: Option<Predicate<T>>,
}

impl<T: Entity> Filter<T> {
    /// Matches every row.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            key: None,
            predicate: None,
        }
    }

    /// Matches the row whose primary key equals `key`.
    #[must_use]
    pub const fn by_key(key: T::Key) -> Self {
        Self {
            key: Some(key),
            predicate: None,
        }
    }

    /// Matches rows accepted by `predicate`.
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            key: None,
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Rows matched by both filters. The key hint of either side is kept.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let key = self.key.clone().or_else(|| other.key.clone());
        Self {
            key,
            predicate: Some(Arc::new(move |entity: &T| {
                self.matches(entity) && other.matches(entity)
            })),
        }
    }

    /// Rows matched by either filter.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            key: None,
            predicate: Some(Arc::new(move |entity: &T| {
                self.matches(entity) || other.matches(entity)
            })),
        }
    }

    /// Rows not matched by this filter.
    #[must_use]
    pub fn negate(self) -> Self {
        Self {
            key: None,
            predicate: Some(Arc::new(move |entity: &T| !self.matches(entity))),
        }
    }

    /// Primary key every matching row must carry, if known.
    #[must_use]
    pub const fn key_hint(&self) -> Option<&T::Key> {
        self.key.as_ref()
    }

    /// Whether the filter carries a predicate beyond its key hint.
    #[must_use]
    pub const fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Whether `entity` satisfies the filter.
    pub fn matches(&self, entity: &T) -> bool {
        let key_ok = self.key.as_ref().is_none_or(|key| entity.key() == *key);
        key_ok && self.predicate.as_ref().is_none_or(|predicate| predicate(entity))
    }
}

impl<T: Entity> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T: Entity> Default for Filter<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T: Entity> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("key", &self.key)
            .field("predicate", &self.predicate.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

/// Derived shape computed from a borrowed row.
pub struct Projection<T, P> {
    selector: Arc<dyn Fn(&T) -> P + Send + Sync>,
}

impl<T, P> Projection<T, P> {
    pub fn new<F>(selector: F) -> Self
    where
        F: Fn(&T) -> P + Send + Sync + 'static,
    {
        Self {
            selector: Arc::new(selector),
        }
    }

    /// Apply the selector to one row.
    pub fn apply(&self, row: &T) -> P {
        (self.selector)(row)
    }
}

impl<T, P> Clone for Projection<T, P> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<T, P> fmt::Debug for Projection<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Projection(<closure>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        label: &'static str,
    }

    impl Entity for Row {
        type Key = i32;
        const TABLE: &'static str = "row";

        fn key(&self) -> i32 {
            self.id
        }

        fn with_key(self, key: i32) -> Self {
            Self { id: key, ..self }
        }
    }

    #[fixture]
    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, label: "a" },
            Row { id: 2, label: "b" },
            Row { id: 3, label: "a" },
        ]
    }

    fn ids(rows: &[Row], filter: &Filter<Row>) -> Vec<i32> {
        rows.iter().filter(|r| filter.matches(r)).map(|r| r.id).collect()
    }

    #[rstest]
    fn all_matches_everything(rows: Vec<Row>) {
        assert_eq!(ids(&rows, &Filter::all()), vec![1, 2, 3]);
    }

    #[rstest]
    fn by_key_matches_single_row(rows: Vec<Row>) {
        assert_eq!(ids(&rows, &Filter::by_key(2)), vec![2]);
    }

    #[rstest]
    fn and_combines_key_hint_and_predicate(rows: Vec<Row>) {
        let filter = Filter::by_key(3).and(Filter::matching(|r: &Row| r.label == "a"));
        assert_eq!(filter.key_hint(), Some(&3));
        assert!(filter.has_predicate());
        assert!(!Filter::<Row>::by_key(3).has_predicate());
        assert_eq!(ids(&rows, &filter), vec![3]);

        let contradiction = Filter::by_key(2).and(Filter::matching(|r: &Row| r.label == "a"));
        assert!(ids(&rows, &contradiction).is_empty());
    }

    #[rstest]
    fn or_and_negate_drop_key_hint(rows: Vec<Row>) {
        let either = Filter::by_key(1).or(Filter::by_key(2));
        assert!(either.key_hint().is_none());
        assert_eq!(ids(&rows, &either), vec![1, 2]);

        let not_a = Filter::matching(|r: &Row| r.label == "a").negate();
        assert!(not_a.key_hint().is_none());
        assert_eq!(ids(&rows, &not_a), vec![2]);
    }

    #[rstest]
    fn projection_reads_borrowed_rows(rows: Vec<Row>) {
        let labels = Projection::new(|r: &Row| r.label.to_uppercase());
        let projected: Vec<String> = rows.iter().map(|r| labels.apply(r)).collect();
        assert_eq!(projected, vec!["A", "B", "A"]);
    }

    #[rstest]
    #[case(1_i32, Some(2_i32))]
    #[case(i32::MAX, None)]
    fn sequential_keys_stop_at_the_limit(#[case] current: i32, #[case] expected: Option<i32>) {
        assert_eq!(current.successor(), expected);
    }
}
