//! Notes API payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type NoteId = i64;
pub type CategoryId = i64;

/// Category as embedded in a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    /// Hex color, eg. `#EF9C66`
    pub color: String,
}

/// Category as listed, with the number of notes assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    pub note_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Currently authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

/// Login or registration form data
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Builds credentials from the submitted form values, trimming the email
    pub fn new(email: &str, password: impl Into<String>) -> Self {
        Self {
            email: email.trim().to_owned(),
            password: password.into(),
        }
    }

    /// Both fields are filled
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial note update
///
/// `category_id` distinguishes leaving the category untouched (`None`) from moving the note out of
/// any category (`Some(None)`), which is sent as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub category_id: Option<Option<CategoryId>>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Moves the note to the category, or out of any category with `None`
    pub fn category(mut self, category: Option<CategoryId>) -> Self {
        self.category_id = Some(category);
        self
    }
}

/// Keeps an explicit `null` apart from a missing field
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_keeps_untouched_fields_out() {
        let patch = NotePatch::default().title("New");
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "title": "New" }));
    }

    #[test]
    fn patch_sends_explicit_no_category() {
        let patch = NotePatch::default().category(None);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "category_id": null })
        );

        let patch = NotePatch::default().category(Some(3)).content("text");
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "content": "text", "category_id": 3 })
        );
    }

    #[test]
    fn patch_parses_null_category() {
        let patch: NotePatch = serde_json::from_value(json!({ "category_id": null })).unwrap();
        assert_eq!(patch.category_id, Some(None));

        let patch: NotePatch = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(patch.category_id, None);
    }

    #[test]
    fn note_without_id_is_rejected() {
        let err = serde_json::from_value::<Note>(json!({})).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn credentials_trim_email() {
        let credentials = Credentials::new("  a@b.com ", "x");
        assert_eq!(credentials.email, "a@b.com");
        assert!(credentials.is_complete());

        assert!(!Credentials::new("   ", "x").is_complete());
        assert!(!Credentials::new("a@b.com", "").is_complete());
        assert!(!format!("{credentials:?}").contains("password: "));
    }
}
