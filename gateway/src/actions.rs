//! Form actions and mutations
//!
//! Actions report their outcome as an [`Effect`]: either an inline result for the form to render,
//! or a navigation. Successful writes list the routes whose rendered views became stale.

use serde::Serialize;
use serde::ser::SerializeStruct;
use tracing::{info, instrument};

use crate::Route;
use crate::client::ApiClient;
use crate::error::Error;
use crate::model::{Credentials, NoteId, NotePatch};
use crate::session::{SessionStore, TokenPair, auth_redirect};

/// Message returned when the login or registration form is incomplete
pub const MISSING_CREDENTIALS: &str = "Email and password are required.";

/// Result rendered inline by the submitting form
///
/// Serialized as `{"success": true}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Error(String),
}

impl Serialize for ActionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut result = serializer.serialize_struct("ActionResult", 1)?;
        match self {
            Self::Success => result.serialize_field("success", &true)?,
            Self::Error(message) => result.serialize_field("error", message)?,
        }
        result.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Inline(ActionResult),
    Redirect(Route),
}

/// What the caller has to do after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub action: Action,
    /// Routes whose rendered views are stale now
    pub revalidate: Vec<Route>,
}

impl Effect {
    pub fn redirect(route: Route) -> Self {
        Self {
            action: Action::Redirect(route),
            revalidate: vec![],
        }
    }

    pub fn success() -> Self {
        Self {
            action: Action::Inline(ActionResult::Success),
            revalidate: vec![],
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            action: Action::Inline(ActionResult::Error(message.into())),
            revalidate: vec![],
        }
    }

    pub fn revalidating(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.revalidate.extend(routes);
        self
    }
}

/// Creates a note and navigates to its editor
///
/// The only failing action: a response without a usable note is returned as an error, as there is
/// no form to report it to.
#[instrument(skip_all)]
pub async fn create_note(
    session: &mut impl SessionStore,
    api: &ApiClient,
) -> Result<Effect, Error> {
    let Some(token) = session.read() else {
        return Ok(Effect::redirect(Route::Login));
    };

    let result = api.gateway(Some(token)).create_note().await;
    if let Some(route) = auth_redirect(session, [result.as_ref().err()]) {
        return Ok(Effect::redirect(route));
    }

    let note = result.map_err(Error::into_fatal)?;
    info!(note = note.id, "Note created");
    Ok(Effect::redirect(Route::Note(note.id)).revalidating([Route::Home]))
}

#[instrument(skip(session, api, patch))]
pub async fn update_note(
    session: &mut impl SessionStore,
    api: &ApiClient,
    id: NoteId,
    patch: &NotePatch,
) -> Effect {
    let Some(token) = session.read() else {
        return Effect::redirect(Route::Login);
    };

    let result = api.gateway(Some(token)).update_note(id, patch).await;
    written(session, id, result.map(drop))
}

#[instrument(skip(session, api))]
pub async fn delete_note(session: &mut impl SessionStore, api: &ApiClient, id: NoteId) -> Effect {
    let Some(token) = session.read() else {
        return Effect::redirect(Route::Login);
    };

    let result = api.gateway(Some(token)).delete_note(id).await;
    written(session, id, result)
}

/// Common outcome of a note write
fn written(session: &mut impl SessionStore, id: NoteId, result: Result<(), Error>) -> Effect {
    if let Some(route) = auth_redirect(session, [result.as_ref().err()]) {
        return Effect::redirect(route);
    }

    match result {
        Ok(()) => Effect::success().revalidating([Route::Note(id), Route::Home]),
        Err(err) => Effect::error(err.to_string()),
    }
}

/// Registers an account and logs in
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn register(
    session: &mut impl SessionStore,
    api: &ApiClient,
    credentials: &Credentials,
) -> Effect {
    if !credentials.is_complete() {
        return Effect::error(MISSING_CREDENTIALS);
    }

    let result = api.gateway(None).register(credentials).await;
    sign_in(session, result)
}

#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login(
    session: &mut impl SessionStore,
    api: &ApiClient,
    credentials: &Credentials,
) -> Effect {
    if !credentials.is_complete() {
        return Effect::error(MISSING_CREDENTIALS);
    }

    let result = api.gateway(None).login(credentials).await;
    sign_in(session, result)
}

fn sign_in(session: &mut impl SessionStore, result: Result<TokenPair, Error>) -> Effect {
    match result {
        Ok(tokens) => {
            session.establish(tokens);
            info!("Session established");
            Effect::redirect(Route::Home)
        }
        Err(err) => Effect::error(err.to_string()),
    }
}

/// Drops the session and navigates to the login page
pub fn logout(session: &mut impl SessionStore) -> Effect {
    session.clear();
    Effect::redirect(Route::Login)
}
