use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table name under the tenant alias
pub const BOOK_TABLE: &str = "book";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: Uuid,
    /// ISBN or other external identifier; unique per tenant
    pub identifier: String,
    pub name: String,
    pub author: String,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a book, or replacing one by identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub identifier: String,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub release_year: Option<i32>,
}

/// Partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
            && self.name.is_none()
            && self.author.is_none()
            && self.release_year.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_release_year_is_optional() {
        let book: NewBook = serde_json::from_str(
            r#"{"identifier": "978-3-16-148410-1", "name": "Time", "author": "S. Hawk"}"#,
        )
        .unwrap();
        assert_eq!(book.release_year, None);

        let missing_author = serde_json::from_str::<NewBook>(
            r#"{"identifier": "978-3-16-148410-1", "name": "Time"}"#,
        );
        assert!(missing_author.is_err());
    }

    #[test]
    fn test_update_treats_null_as_absent() {
        let update: BookUpdate = serde_json::from_str(
            r#"{"identifier": "978-3-16-148410-89", "name": "", "author": null}"#,
        )
        .unwrap();
        assert_eq!(update.identifier.as_deref(), Some("978-3-16-148410-89"));
        assert_eq!(update.name.as_deref(), Some(""));
        assert_eq!(update.author, None);
        assert!(!update.is_empty());
        assert!(BookUpdate::default().is_empty());
    }

    #[test]
    fn test_update_ignores_id_in_payload() {
        let update: BookUpdate =
            serde_json::from_str(r#"{"id": "5a1f6c0e-5a9f-4d63-9b1f-0c3e6d2b8a11", "release_year": 2045}"#)
                .unwrap();
        assert_eq!(update.release_year, Some(2045));
    }
}
