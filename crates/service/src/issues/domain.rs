use models::IssuePatch;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Create input. Every field is optional on the wire so that a missing
/// required field is reported as a body-level error, not a decode failure.
/// A field of the wrong JSON type counts as not sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateIssueInput {
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status_text: Option<String>,
}

/// Update input: `_id` plus any subset of the updatable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIssueInput {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub open: Option<bool>,
}

impl UpdateIssueInput {
    /// Non-empty `_id`, if one was sent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }

    /// Fields to overwrite. Empty or whitespace-only strings count as "not sent".
    pub fn patch(&self) -> IssuePatch {
        fn sent(v: &Option<String>) -> Option<String> {
            v.as_ref().filter(|s| !s.trim().is_empty()).cloned()
        }
        IssuePatch {
            issue_title: sent(&self.issue_title),
            issue_text: sent(&self.issue_text),
            created_by: sent(&self.created_by),
            assigned_to: sent(&self.assigned_to),
            status_text: sent(&self.status_text),
            open: self.open,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteIssueInput {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

impl DeleteIssueInput {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }
}

/// Accepts a string, or any other scalar rendered as text.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Strings only; any other JSON type is dropped instead of failing the whole body.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Accepts `true`/`false` as JSON booleans or strings (form checkboxes send
/// strings). Anything else is treated as not sent.
fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
