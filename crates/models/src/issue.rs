use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// An issue as returned to API callers.
///
/// Field order matches the JSON body clients receive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub issue_title: String,
    pub issue_text: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

/// Persisted form of an issue: the issue plus the project it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssueDocument {
    pub project: String,
    #[serde(flatten)]
    pub issue: Issue,
}

/// Validated creation input. Optional fields are already defaulted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewIssue {
    pub fn new(
        issue_title: Option<String>,
        issue_text: Option<String>,
        created_by: Option<String>,
        assigned_to: Option<String>,
        status_text: Option<String>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            issue_title: required("issue_title", issue_title)?,
            issue_text: required("issue_text", issue_text)?,
            created_by: required("created_by", created_by)?,
            assigned_to: assigned_to.unwrap_or_default(),
            status_text: status_text.unwrap_or_default(),
        })
    }

    /// Stamp the input into a fresh issue with a new id.
    pub fn into_issue(self, now: DateTime<Utc>) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            created_on: now,
            updated_on: now,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            open: true,
            status_text: self.status_text,
        }
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ModelError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ModelError::Validation(format!("{field} required"))),
    }
}

/// Partial replacement of the updatable fields. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IssuePatch {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

impl Issue {
    /// Overwrite the supplied fields and refresh `updated_on`.
    ///
    /// `updated_on` never moves behind `created_on`, even with a skewed clock.
    pub fn apply(&mut self, patch: IssuePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.issue_title { self.issue_title = v; }
        if let Some(v) = patch.issue_text { self.issue_text = v; }
        if let Some(v) = patch.created_by { self.created_by = v; }
        if let Some(v) = patch.assigned_to { self.assigned_to = v; }
        if let Some(v) = patch.status_text { self.status_text = v; }
        if let Some(v) = patch.open { self.open = v; }
        self.updated_on = now.max(self.created_on);
    }

    pub fn matches(&self, filter: &IssueFilter) -> bool {
        if filter.is_empty() {
            return true;
        }
        let doc = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return false,
        };
        filter.iter().all(|(field, expected)| match doc.get(field) {
            Some(serde_json::Value::String(s)) => s == expected,
            Some(serde_json::Value::Bool(b)) => b.to_string() == *expected,
            Some(other) => other.to_string() == *expected,
            None => false,
        })
    }
}

/// Field/value equality constraints, all of which must hold.
///
/// Values are compared against the JSON text of the field, so `open=false`
/// and `_id=<uuid>` work the same way as string fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssueFilter(BTreeMap<String, String>);

impl IssueFilter {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> { self.0.iter() }
}

impl From<BTreeMap<String, String>> for IssueFilter {
    fn from(map: BTreeMap<String, String>) -> Self { Self(map) }
}

impl FromIterator<(String, String)> for IssueFilter {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Issue {
        NewIssue::new(
            Some("Issue 1".into()),
            Some("Functional Test".into()),
            Some("fCC".into()),
            Some("Dom".into()),
            None,
        )
        .unwrap()
        .into_issue(Utc::now())
    }

    #[test]
    fn new_issue_defaults_optional_fields() {
        let issue = NewIssue::new(Some("t".into()), Some("x".into()), Some("me".into()), None, None)
            .unwrap()
            .into_issue(Utc::now());
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "");
        assert!(issue.open);
        assert_eq!(issue.created_on, issue.updated_on);
    }

    #[test]
    fn new_issue_rejects_missing_or_blank_required() {
        assert!(NewIssue::new(None, Some("x".into()), Some("me".into()), None, None).is_err());
        assert!(NewIssue::new(Some("t".into()), Some("".into()), Some("me".into()), None, None).is_err());
        assert!(NewIssue::new(Some("t".into()), Some("x".into()), Some("   ".into()), None, None).is_err());
    }

    #[test]
    fn serializes_with_underscore_id() {
        let issue = sample();
        let v = serde_json::to_value(&issue).unwrap();
        assert_eq!(v["_id"], issue.id.to_string());
        assert_eq!(v["open"], true);
        assert!(v.get("id").is_none());
        assert!(v.get("project").is_none());
    }

    #[test]
    fn document_flattens_issue_fields() {
        let doc = IssueDocument { project: "apitest".into(), issue: sample() };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["project"], "apitest");
        assert_eq!(v["issue_title"], "Issue 1");
        let back: IssueDocument = serde_json::from_value(v).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn apply_overwrites_only_supplied_fields() {
        let mut issue = sample();
        let later = issue.created_on + Duration::seconds(5);
        issue.apply(IssuePatch { issue_title: Some("different".into()), open: Some(false), ..Default::default() }, later);
        assert_eq!(issue.issue_title, "different");
        assert_eq!(issue.issue_text, "Functional Test");
        assert_eq!(issue.assigned_to, "Dom");
        assert!(!issue.open);
        assert_eq!(issue.updated_on, later);
    }

    #[test]
    fn apply_keeps_updated_on_after_created_on() {
        let mut issue = sample();
        let earlier = issue.created_on - Duration::seconds(30);
        issue.apply(IssuePatch { status_text: Some("x".into()), ..Default::default() }, earlier);
        assert_eq!(issue.updated_on, issue.created_on);
    }

    #[test]
    fn patch_emptiness() {
        assert!(IssuePatch::default().is_empty());
        assert!(!IssuePatch { open: Some(true), ..Default::default() }.is_empty());
    }

    #[test]
    fn filter_matches_all_fields() {
        let issue = sample();
        assert!(issue.matches(&IssueFilter::new()));
        assert!(issue.matches(&IssueFilter::new().with("_id", issue.id.to_string())));
        assert!(issue.matches(&IssueFilter::new().with("created_by", "fCC").with("assigned_to", "Dom")));
        assert!(issue.matches(&IssueFilter::new().with("open", "true")));
        assert!(!issue.matches(&IssueFilter::new().with("created_by", "fCC").with("assigned_to", "Joe")));
        assert!(!issue.matches(&IssueFilter::new().with("open", "false")));
        assert!(!issue.matches(&IssueFilter::new().with("priority", "high")));
    }

    #[test]
    fn filter_matches_timestamp_text() {
        let issue = sample();
        let v = serde_json::to_value(&issue).unwrap();
        let created = v["created_on"].as_str().unwrap().to_string();
        assert!(issue.matches(&IssueFilter::new().with("created_on", created)));
    }
}
