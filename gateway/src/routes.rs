//! Application routes used as redirect and revalidation targets

use std::fmt;

use crate::model::NoteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Notes dashboard
    Home,
    Login,
    Signup,
    /// Note details page
    Note(NoteId),
}

impl Route {
    /// Path of the route on the front server
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Signup => "/signup".to_owned(),
            Self::Note(id) => format!("/notes/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
