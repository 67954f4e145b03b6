//! Keyed containers of entities
//!
//! `EntityCollection` keeps entries in first-seen order so name lookups resolve
//! deterministically: names are not unique on the service, and when several
//! entries share one the first in iteration order wins.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::entity::{Entity, EntityId};
use crate::error::Result;

/// Entities of one kind, keyed by id.
///
/// Merging never removes entries and never creates a second entry for an id
/// already present; an existing entry is updated in place.
#[derive(Debug)]
pub struct EntityCollection<E> {
    entries: IndexMap<EntityId, E>,
}

impl<E> Default for EntityCollection<E> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<E: Entity> EntityCollection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a sequence of fragments.
    ///
    /// Returns `Ok(false)` without touching anything when `fragments` is
    /// absent or not an array. Every fragment, nested collections included, is
    /// validated before the first one is applied, so a failure leaves this
    /// collection and every entity in it unchanged.
    pub fn merge_snapshot(&mut self, fragments: Option<&Value>) -> Result<bool> {
        let Some(items) = fragments.and_then(Value::as_array) else {
            return Ok(false);
        };

        let validated = items
            .iter()
            .map(E::validate_fragment)
            .collect::<Result<Vec<_>>>()?;

        let mut created = 0usize;
        for (id, wire) in validated {
            match self.entries.get_mut(&id) {
                Some(existing) => {
                    existing.apply_fragment(id, wire)?;
                }
                None => {
                    let mut entity = E::default();
                    entity.apply_fragment(id.clone(), wire)?;
                    self.entries.insert(id, entity);
                    created += 1;
                }
            }
        }

        debug!(
            "[EntityCollection] Merged {} {} fragments ({} new, {} total)",
            items.len(),
            E::KIND,
            created,
            self.entries.len()
        );
        Ok(true)
    }

    /// Validates a sequence of fragments without merging anything.
    pub fn validate_snapshot(fragments: Option<&Value>) -> Result<()> {
        if let Some(items) = fragments.and_then(Value::as_array) {
            for fragment in items {
                E::validate_fragment(fragment)?;
            }
        }
        Ok(())
    }

    pub fn by_id(&self, id: &str) -> Option<&E> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// First entry whose name equals `name`.
    pub fn by_name(&self, name: &str) -> Option<&E> {
        self.by_attr(|entity: &E| entity.name(), name)
    }

    /// Entries whose name equals any of `names`.
    pub fn by_names<S: AsRef<str>>(&self, names: &[S]) -> Selection<'_, E> {
        let mut selection = Selection::default();
        for name in names {
            for (id, entity) in &self.entries {
                if entity.name() == Some(name.as_ref()) {
                    selection.entries.insert(id, entity);
                }
            }
        }
        selection
    }

    /// First entry whose attribute equals `value`.
    pub fn by_attr<V>(&self, attr: impl Fn(&E) -> Option<&V>, value: &V) -> Option<&E>
    where
        V: PartialEq + ?Sized,
    {
        self.entries
            .values()
            .find(|entity| attr(*entity).is_some_and(|v| v == value))
    }

    /// Entries whose attribute equals any of `values`, grouped by value order.
    ///
    /// The result is a view over this collection; nothing is copied or moved.
    pub fn by_attr_any<V>(&self, attr: impl Fn(&E) -> Option<&V>, values: &[V]) -> Selection<'_, E>
    where
        V: PartialEq,
    {
        let mut selection = Selection::default();
        for value in values {
            for (id, entity) in &self.entries {
                if attr(entity).is_some_and(|v| v == value) {
                    selection.entries.insert(id, entity);
                }
            }
        }
        selection
    }

    /// Entries with the given ids, in the order given; unknown ids are skipped.
    pub fn select_ids<'a, I>(&'a self, ids: I) -> Selection<'a, E>
    where
        I: IntoIterator<Item = &'a EntityId>,
    {
        let mut selection = Selection::default();
        for id in ids {
            if let Some((key, entity)) = self.entries.get_key_value(id.as_str()) {
                selection.entries.insert(key, entity);
            }
        }
        selection
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.keys()
    }

    /// Names aligned with `ids()`.
    pub fn names(&self) -> Vec<Option<&str>> {
        self.entries.values().map(Entity::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &E)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A borrowed subset of an `EntityCollection`.
#[derive(Debug)]
pub struct Selection<'a, E> {
    entries: IndexMap<&'a EntityId, &'a E>,
}

impl<E> Default for Selection<'_, E> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<'a, E: Entity> Selection<'a, E> {
    pub fn by_id(&self, id: &str) -> Option<&'a E> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_str() == id)
            .map(|(_, entity)| *entity)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.keys().any(|key| key.as_str() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a EntityId> + '_ {
        self.entries.keys().copied()
    }

    pub fn names(&self) -> Vec<Option<&'a str>> {
        self.entries.values().map(|entity| (*entity).name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a E> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
