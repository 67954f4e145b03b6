//! Entity identity and the merge contract shared by every object kind
//!
//! A snapshot fragment is a JSON object tagged with `objectType`. Entities only
//! accept fragments of their own kind: `Entity::id_of` classifies a fragment
//! without touching state, `Entity::merge_fragment` copies its fields in place.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

use crate::error::{Result, ScrumwiseError};

/// The closed set of object kinds the client mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Data,
    Project,
    BacklogItem,
    Task,
    Tag,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Data => "Data",
            ObjectKind::Project => "Project",
            ObjectKind::BacklogItem => "BacklogItem",
            ObjectKind::Task => "Task",
            ObjectKind::Tag => "Tag",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Data" => Some(ObjectKind::Data),
            "Project" => Some(ObjectKind::Project),
            "BacklogItem" => Some(ObjectKind::BacklogItem),
            "Task" => Some(ObjectKind::Task),
            "Tag" => Some(ObjectKind::Tag),
            _ => None,
        }
    }

    /// Raw `objectType` declared by a fragment, if any.
    pub fn declared_by(fragment: &Value) -> Option<&str> {
        fragment.get("objectType").and_then(Value::as_str)
    }

    /// Kind declared by a fragment, if it is one we know.
    pub fn of(fragment: &Value) -> Option<Self> {
        Self::declared_by(fragment).and_then(Self::parse)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier assigned by the Scrumwise service.
///
/// The service sends ids as strings, but integers are accepted too and kept in
/// their decimal form so both spellings address the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id from a JSON scalar; anything but a string or integer is no id.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntityId(s),
            RawId::Signed(n) => EntityId(n.to_string()),
            RawId::Unsigned(n) => EntityId(n.to_string()),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A mirrored domain object of one fixed kind.
///
/// Implementors provide field copying (`apply_fragment`) from their typed wire
/// fragment. `validate_fragment` checks the kind, the id, the wire shape and
/// any nested collections, so a fragment that passes it applies without error.
pub trait Entity: Default {
    const KIND: ObjectKind;

    type Fragment: DeserializeOwned;

    fn id(&self) -> Option<&EntityId>;

    fn name(&self) -> Option<&str>;

    /// Copies recognised fields from a fragment that passed `validate_fragment`.
    fn apply_fragment(&mut self, id: EntityId, wire: Self::Fragment) -> Result<()>;

    /// Checks the nested collections carried by a parsed fragment.
    fn validate_nested(_wire: &Self::Fragment) -> Result<()> {
        Ok(())
    }

    fn is_initialised(&self) -> bool {
        self.id().is_some()
    }

    /// The fragment's id if it declares this entity's kind.
    fn id_of(fragment: &Value) -> Option<EntityId> {
        match ObjectKind::of(fragment) {
            Some(kind) if kind == Self::KIND => fragment.get("id").and_then(EntityId::from_json),
            _ => None,
        }
    }

    /// Checks a fragment against `KIND` and returns its id without merging it.
    fn check_fragment(fragment: &Value) -> Result<EntityId> {
        if ObjectKind::of(fragment) != Some(Self::KIND) {
            return Err(ScrumwiseError::TypeMismatch {
                expected: Self::KIND,
                found: ObjectKind::declared_by(fragment).map(str::to_string),
            });
        }
        Self::id_of(fragment).ok_or(ScrumwiseError::MissingId { kind: Self::KIND })
    }

    /// Checks a fragment and everything nested in it, returning the parsed form.
    fn validate_fragment(fragment: &Value) -> Result<(EntityId, Self::Fragment)> {
        let id = Self::check_fragment(fragment)?;
        let wire = parse_fragment(Self::KIND, fragment)?;
        Self::validate_nested(&wire)?;
        Ok((id, wire))
    }

    /// Merges one fragment into this entity, assigning its id.
    ///
    /// Nothing is modified unless the whole fragment validates.
    fn merge_fragment(&mut self, fragment: &Value) -> Result<bool> {
        let (id, wire) = Self::validate_fragment(fragment)?;
        self.apply_fragment(id, wire)?;
        Ok(true)
    }

    /// Diagnostic form: `"{kind}: {id}"`, or a note that the entity has no id yet.
    fn describe(&self) -> String {
        match self.id() {
            Some(id) => format!("{}: {}", Self::KIND, id),
            None => format!("{} is not initialised", Self::KIND),
        }
    }
}

/// Deserialises a fragment into its typed wire struct.
pub(crate) fn parse_fragment<T: DeserializeOwned>(
    kind: ObjectKind,
    fragment: &Value,
) -> Result<T> {
    serde_json::from_value(fragment.clone())
        .map_err(|source| ScrumwiseError::MalformedFragment { kind, source })
}
