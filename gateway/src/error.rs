//! Gateway failures

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No session where one is required
    #[error("Not authenticated")]
    Unauthenticated,
    /// The Notes API rejected the access token
    #[error("Session is no longer valid")]
    SessionInvalidated,
    #[error("Not found")]
    NotFound,
    /// The Notes API rejected the submitted data
    #[error("{0}")]
    ValidationFailed(String),
    /// Transport failure, unexpected status or malformed response
    #[error("{0}")]
    RequestFailed(String),
}

impl Error {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::RequestFailed(format!("Cannot reach the Notes API: {err}"))
    }

    /// Converts the failure into one reported as a fatal page error
    pub fn into_fatal(self) -> Self {
        match self {
            Self::RequestFailed(_) => self,
            other => Self::RequestFailed(other.to_string()),
        }
    }
}

/// Error payload returned by the Notes API
///
/// Field errors come as lists of messages, though a single string is accepted as well.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, deserialize_with = "messages")]
    email: Vec<String>,
    #[serde(default, deserialize_with = "messages")]
    password: Vec<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorBody {
    /// Parses the body, any unexpected shape yields an empty payload
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Most specific message available: email error, password error, then the detail
    pub fn message(&self) -> Option<&str> {
        self.email
            .first()
            .or_else(|| self.password.first())
            .or(self.detail.as_ref())
            .map(String::as_str)
    }
}

fn messages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Messages {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Messages::deserialize(deserializer)? {
        Messages::One(message) => vec![message],
        Messages::Many(messages) => messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(body: &str) -> Option<String> {
        ErrorBody::parse(body.as_bytes()).message().map(str::to_owned)
    }

    #[test]
    fn email_error_goes_first() {
        let body = r#"{
            "detail": "Bad request",
            "password": ["Ensure this field has at least 8 characters."],
            "email": ["A user with this email already exists."]
        }"#;

        assert_eq!(
            message(body).as_deref(),
            Some("A user with this email already exists.")
        );
    }

    #[test]
    fn password_error_before_detail() {
        let body = r#"{ "detail": "Bad request", "password": ["Too short."] }"#;
        assert_eq!(message(body).as_deref(), Some("Too short."));
    }

    #[test]
    fn detail_as_last_resort() {
        let body = r#"{ "detail": "Invalid email or password.", "email": [] }"#;
        assert_eq!(message(body).as_deref(), Some("Invalid email or password."));
    }

    #[test]
    fn single_string_field_error() {
        assert_eq!(message(r#"{ "email": "Taken" }"#).as_deref(), Some("Taken"));
    }

    #[test]
    fn unexpected_bodies_have_no_message() {
        assert_eq!(message(""), None);
        assert_eq!(message("<html>Bad gateway</html>"), None);
        assert_eq!(message(r#"{ "email": 42 }"#), None);
        assert_eq!(message("{}"), None);
    }

    #[test]
    fn fatal_errors_carry_the_reason() {
        assert_eq!(
            Error::NotFound.into_fatal(),
            Error::RequestFailed("Not found".into())
        );
        assert_eq!(
            Error::RequestFailed("boom".into()).into_fatal(),
            Error::RequestFailed("boom".into())
        );
    }
}
