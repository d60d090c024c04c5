use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task as stored in the database and returned by the API.
///
/// `owner_id` is set once at creation from the authenticated requester and is
/// never updatable through any route.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. The owner is never part of the payload; it
/// always comes from the authenticated user.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub completed: Option<bool>,
}

/// Patch payload for `PATCH /tasks/:id`. The key set must be a subset of
/// {description, completed}; `deny_unknown_fields` rejects the entire body
/// otherwise, so a patch with a stray key never applies partially.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Query parameters for `GET /tasks`.
///
/// Every parameter is deserialized as a raw string and parsed leniently:
/// values that do not parse are treated as if they were absent, never as an
/// error. This laxity is specified behavior carried over from the original
/// API, not an accident.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl TaskQuery {
    /// Restricts by completion state only for the literal strings
    /// "true"/"false". Anything else means no filter.
    pub fn completed_filter(&self) -> Option<bool> {
        match self.completed.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Parses `sortBy` as `field:direction`. The field must be one of the
    /// sortable JSON names; unknown fields are ignored rather than erroring,
    /// since column names cannot be bound as SQL parameters. Any direction
    /// token other than the literal "desc" sorts ascending.
    pub fn order_clause(&self) -> Option<(&'static str, &'static str)> {
        let sort_by = self.sort_by.as_deref()?;
        let mut parts = sort_by.splitn(2, ':');
        let column = match parts.next()? {
            "createdAt" => "created_at",
            "updatedAt" => "updated_at",
            "description" => "description",
            "completed" => "completed",
            _ => return None,
        };
        let direction = match parts.next() {
            Some("desc") => "DESC",
            _ => "ASC",
        };
        Some((column, direction))
    }

    /// Values that do not parse as a non-negative integer mean "no limit".
    /// Postgres rejects negative LIMIT/OFFSET outright, so those fall under
    /// the same lenient treatment as non-numeric input.
    pub fn limit(&self) -> Option<i64> {
        self.limit
            .as_deref()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v >= 0)
    }

    pub fn skip(&self) -> Option<i64> {
        self.skip
            .as_deref()
            .and_then(|v| v.parse().ok())
            .filter(|v: &i64| *v >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query(completed: Option<&str>, sort_by: Option<&str>, limit: Option<&str>, skip: Option<&str>) -> TaskQuery {
        TaskQuery {
            completed: completed.map(String::from),
            sort_by: sort_by.map(String::from),
            limit: limit.map(String::from),
            skip: skip.map(String::from),
        }
    }

    #[test]
    fn test_completed_filter_accepts_only_literal_booleans() {
        assert_eq!(query(Some("true"), None, None, None).completed_filter(), Some(true));
        assert_eq!(query(Some("false"), None, None, None).completed_filter(), Some(false));
        // any other value means "not provided"
        assert_eq!(query(Some("TRUE"), None, None, None).completed_filter(), None);
        assert_eq!(query(Some("1"), None, None, None).completed_filter(), None);
        assert_eq!(query(Some("yes"), None, None, None).completed_filter(), None);
        assert_eq!(query(None, None, None, None).completed_filter(), None);
    }

    #[test]
    fn test_order_clause_parsing() {
        assert_eq!(
            query(None, Some("createdAt:desc"), None, None).order_clause(),
            Some(("created_at", "DESC"))
        );
        assert_eq!(
            query(None, Some("createdAt:asc"), None, None).order_clause(),
            Some(("created_at", "ASC"))
        );
        // anything that is not the literal "desc" sorts ascending
        assert_eq!(
            query(None, Some("completed:banana"), None, None).order_clause(),
            Some(("completed", "ASC"))
        );
        assert_eq!(
            query(None, Some("description"), None, None).order_clause(),
            Some(("description", "ASC"))
        );
        // unknown fields are ignored, not an error
        assert_eq!(query(None, Some("owner_id:desc"), None, None).order_clause(), None);
        assert_eq!(
            query(None, Some("created_at; DROP TABLE tasks"), None, None).order_clause(),
            None
        );
        assert_eq!(query(None, None, None, None).order_clause(), None);
    }

    #[test]
    fn test_lenient_pagination_parsing() {
        let q = query(None, None, Some("10"), Some("20"));
        assert_eq!(q.limit(), Some(10));
        assert_eq!(q.skip(), Some(20));

        // non-numeric values resolve to "no limit" / "no skip"
        let q = query(None, None, Some("ten"), Some("2.5"));
        assert_eq!(q.limit(), None);
        assert_eq!(q.skip(), None);

        // negative values get the same lenient treatment
        let q = query(None, None, Some("-1"), Some("-5"));
        assert_eq!(q.limit(), None);
        assert_eq!(q.skip(), None);

        let q = query(None, None, None, None);
        assert_eq!(q.limit(), None);
        assert_eq!(q.skip(), None);
    }

    #[test]
    fn test_task_patch_rejects_unknown_keys() {
        let patch: Result<TaskPatch, _> =
            serde_json::from_value(serde_json::json!({ "location": "x" }));
        assert!(patch.is_err());

        // a stray key rejects the body even when valid keys are present too
        let patch: Result<TaskPatch, _> =
            serde_json::from_value(serde_json::json!({ "completed": true, "location": "x" }));
        assert!(patch.is_err());

        // owner reassignment is just another unknown key
        let patch: Result<TaskPatch, _> =
            serde_json::from_value(serde_json::json!({ "owner_id": 2 }));
        assert!(patch.is_err());

        let patch: TaskPatch =
            serde_json::from_value(serde_json::json!({ "completed": true })).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert!(patch.description.is_none());
    }

    #[test]
    fn test_task_input_validation() {
        let input = TaskInput {
            description: "Buy milk".to_string(),
            completed: None,
        };
        assert!(input.validate().is_ok());

        let input = TaskInput {
            description: "".to_string(),
            completed: Some(true),
        };
        assert!(input.validate().is_err());
    }
}
