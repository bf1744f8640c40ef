//! Notes API client

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorBody};
use crate::model::{Category, CategoryId, Credentials, Note, NoteId, NotePatch, User};
use crate::session::{AccessToken, TokenPair};

/// Message returned when registration fails without any explanation from the API
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Message returned when login fails without any explanation from the API
pub const LOGIN_FAILED: &str = "Invalid email or password.";

/// Shared access to the Notes API
///
/// Holds the connection pool and the base URL. Requests are issued through a [`Gateway`] bound to
/// the session of the current invocation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the API hosted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(Error::transport)?;
        Ok(Self::with_http(http, base_url))
    }

    /// Creates a client reusing an existing connection pool
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Binds a gateway to the access token
    ///
    /// Without a token, only anonymous operations (login and registration) can succeed.
    pub fn gateway(&self, token: Option<AccessToken>) -> Gateway<'_> {
        Gateway { api: self, token }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Issues requests on behalf of a single session
#[derive(Debug)]
pub struct Gateway<'a> {
    api: &'a ApiClient,
    token: Option<AccessToken>,
}

impl Gateway<'_> {
    /// Registers a new account returning its session tokens
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> Result<TokenPair, Error> {
        self.obtain_tokens("/api/auth/register/", credentials, REGISTRATION_FAILED)
            .await
    }

    /// Exchanges credentials for session tokens
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, Error> {
        self.obtain_tokens("/api/auth/token/", credentials, LOGIN_FAILED)
            .await
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, Error> {
        let request = self.authorized(Method::GET, "/api/auth/me/")?;
        self.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        let request = self.authorized(Method::GET, "/api/categories/")?;
        self.fetch(request).await
    }

    /// Lists notes, optionally only the ones in the category
    #[instrument(skip(self))]
    pub async fn list_notes(&self, category: Option<CategoryId>) -> Result<Vec<Note>, Error> {
        let mut request = self.authorized(Method::GET, "/api/notes/")?;
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        self.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn note(&self, id: NoteId) -> Result<Note, Error> {
        let request = self.authorized(Method::GET, &format!("/api/notes/{id}/"))?;
        self.fetch(request).await
    }

    /// Creates an empty note, the API fills in the defaults
    #[instrument(skip(self))]
    pub async fn create_note(&self) -> Result<Note, Error> {
        let request = self.authorized(Method::POST, "/api/notes/")?;
        self.fetch(request).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_note(&self, id: NoteId, patch: &NotePatch) -> Result<Note, Error> {
        let request = self
            .authorized(Method::PATCH, &format!("/api/notes/{id}/"))?
            .json(patch);
        self.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn delete_note(&self, id: NoteId) -> Result<(), Error> {
        let request = self.authorized(Method::DELETE, &format!("/api/notes/{id}/"))?;
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?;
        failure(status, &body).map_or(Ok(()), Err)
    }

    /// Builds a request carrying the bearer token
    ///
    /// Fails without issuing anything if the gateway has no token.
    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let token = self.token.as_ref().ok_or(Error::Unauthenticated)?;
        Ok(self
            .api
            .http
            .request(method, self.api.url(path))
            .bearer_auth(token.as_str()))
    }

    /// Sends the request applying the authentication boundary
    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await.map_err(Error::transport)?;
        let status = response.status();
        debug!(%status, url = %response.url(), "Notes API responded");

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Access token rejected by the Notes API");
                Err(Error::SessionInvalidated)
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            _ => Ok(response),
        }
    }

    /// Sends the request and decodes the successful response
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?;

        if let Some(err) = failure(status, &body) {
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|err| {
            warn!(%err, "Malformed Notes API response");
            Error::RequestFailed(format!("Malformed response from the Notes API: {err}"))
        })
    }

    /// Anonymous credentials exchange used by both login and registration
    ///
    /// Any failure, including a successful response without tokens, is reported as a validation
    /// failure with the most specific message the API provided.
    async fn obtain_tokens(
        &self,
        path: &str,
        credentials: &Credentials,
        fallback: &str,
    ) -> Result<TokenPair, Error> {
        let response = self
            .api
            .http
            .post(self.api.url(path))
            .json(credentials)
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Error::transport)?;
        debug!(%status, "Notes API responded");

        if status.is_success() {
            if let Ok(tokens) = serde_json::from_slice::<TokenPair>(&body) {
                return Ok(tokens);
            }
            warn!("Tokens missing in a successful response");
        }

        let message = ErrorBody::parse(&body)
            .message()
            .unwrap_or(fallback)
            .to_owned();
        Err(Error::ValidationFailed(message))
    }
}

/// Error for a non-success status, described by the body if possible
fn failure(status: StatusCode, body: &[u8]) -> Option<Error> {
    if status.is_success() {
        return None;
    }

    let message = ErrorBody::parse(body)
        .message()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Notes API responded with {status}"));
    Some(Error::RequestFailed(message))
}
