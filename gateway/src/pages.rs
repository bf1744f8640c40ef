//! Page-level reads
//!
//! Every page checks the session before touching the API. Authentication failures turn into a
//! redirect to the login page, any other failure is fatal for the page and returned as
//! [`Error::RequestFailed`].

use serde::Serialize;
use tracing::instrument;

use crate::Route;
use crate::client::ApiClient;
use crate::error::Error;
use crate::model::{Category, CategoryId, Note, NoteId, User};
use crate::session::{SessionStore, auth_redirect};

/// Outcome of a page read
#[derive(Debug, Clone, PartialEq)]
pub enum Page<T> {
    /// Data to render
    Render(T),
    /// The requested resource doesn't exist
    NotFound,
    Redirect(Route),
}

/// Notes dashboard view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub user: User,
    /// Category the notes are filtered by
    pub category: Option<CategoryId>,
    pub notes: Vec<Note>,
    pub categories: Vec<Category>,
}

/// Note editor view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub note: Note,
    pub categories: Vec<Category>,
}

/// Loads the dashboard fetching the user, notes and categories concurrently
#[instrument(skip(session, api))]
pub async fn dashboard(
    session: &mut impl SessionStore,
    api: &ApiClient,
    category: Option<CategoryId>,
) -> Result<Page<Dashboard>, Error> {
    let Some(token) = session.read() else {
        return Ok(Page::Redirect(Route::Login));
    };

    let gateway = api.gateway(Some(token));
    let (user, notes, categories) = tokio::join!(
        gateway.current_user(),
        gateway.list_notes(category),
        gateway.list_categories()
    );

    let failures = [
        user.as_ref().err(),
        notes.as_ref().err(),
        categories.as_ref().err(),
    ];
    if let Some(route) = auth_redirect(session, failures) {
        return Ok(Page::Redirect(route));
    }

    Ok(Page::Render(Dashboard {
        user: user.map_err(Error::into_fatal)?,
        category,
        notes: notes.map_err(Error::into_fatal)?,
        categories: categories.map_err(Error::into_fatal)?,
    }))
}

/// Loads the note editor for the note id taken from the path
///
/// Id which is not made of digits only is not found without asking the API.
#[instrument(skip(session, api))]
pub async fn note(
    session: &mut impl SessionStore,
    api: &ApiClient,
    id: &str,
) -> Result<Page<NoteView>, Error> {
    let Some(id) = note_id(id) else {
        return Ok(Page::NotFound);
    };

    let Some(token) = session.read() else {
        return Ok(Page::Redirect(Route::Login));
    };

    let gateway = api.gateway(Some(token));
    let (note, categories) = tokio::join!(gateway.note(id), gateway.list_categories());

    if let Some(route) = auth_redirect(session, [note.as_ref().err(), categories.as_ref().err()]) {
        return Ok(Page::Redirect(route));
    }

    let note = match note {
        Ok(note) => note,
        Err(Error::NotFound) => return Ok(Page::NotFound),
        Err(err) => return Err(err.into_fatal()),
    };

    Ok(Page::Render(NoteView {
        note,
        categories: categories.map_err(Error::into_fatal)?,
    }))
}

/// Note id from the path segment, digits only
fn note_id(segment: &str) -> Option<NoteId> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
