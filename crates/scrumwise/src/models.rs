//! Wire models for the Scrumwise API
//!
//! Fragments keep nested collections as raw JSON so each level can decide for
//! itself whether there is anything to merge. Only ids, references and the item
//! number are strictly typed; descriptive fields accept whatever the service
//! sends.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::entity::EntityId;

/// Reads a descriptive text field.
///
/// Numbers and booleans keep their JSON spelling; structured values carry no
/// usable text and read as `None`.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFragment {
    pub id: EntityId,
    #[serde(rename = "externalID", default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rough_estimate_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub detailed_estimate_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time_tracking_unit: Option<String>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub backlog_items: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItemFragment {
    pub id: EntityId,
    #[serde(rename = "externalID", default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(rename = "projectID", default)]
    pub project_id: Option<EntityId>,
    #[serde(default)]
    pub item_number: Option<i64>,
    #[serde(default)]
    pub tasks: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFragment {
    pub id: EntityId,
    #[serde(rename = "externalID", default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(rename = "projectID", default)]
    pub project_id: Option<EntityId>,
    #[serde(rename = "backlogItemID", default)]
    pub backlog_item_id: Option<EntityId>,
    #[serde(rename = "tagIDs", default)]
    pub tag_ids: Option<Vec<EntityId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFragment {
    pub id: EntityId,
    #[serde(rename = "externalID", default, deserialize_with = "lenient_text")]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(rename = "projectID", default)]
    pub project_id: Option<EntityId>,
}

/// Envelope every API response shares.
///
/// `data_version` stays optional here: a response without it is still parsed
/// so the caller can report the missing version instead of a decode error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub data_version: Option<i64>,
    #[serde(default)]
    pub result: Option<Value>,
}

/// The `result` object of a getData response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResult {
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub persons: Option<Value>,
    #[serde(default)]
    pub deleted_persons: Option<Value>,
    #[serde(default)]
    pub projects: Option<Value>,
}
