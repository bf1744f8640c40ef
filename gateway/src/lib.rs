//! Session-bound access to the Notes API
//!
//! Every page and form action of the notes front server goes through this crate: the session is
//! read from a [`SessionStore`], a [`Gateway`] bound to its access token issues the requests, and the
//! uniform authentication policy turns missing or rejected sessions into a redirect to the login
//! page.

pub mod actions;
pub mod client;
pub mod error;
pub mod model;
pub mod pages;
pub mod routes;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;


pub use client::{ApiClient, Gateway};
pub use error::Error;
pub use routes::Route;
pub use session::{AccessToken, MemorySession, RefreshToken, SessionStore, TokenPair};
