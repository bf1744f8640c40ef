//! Front server endpoints
//!
//! Pages are served as JSON views, form actions answer with a redirect or with the inline
//! `{"success": true}` / `{"error": "..."}` result.

use actix_web::error::ErrorBadGateway;
use actix_web::http::header;
use actix_web::web::{self, Data, ServiceConfig};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, Result, delete, get, patch, post};
use notes_gateway::actions::{self, Action, Effect};
use notes_gateway::model::{CategoryId, Credentials, NoteId, NotePatch};
use notes_gateway::pages::{self, Page};
use notes_gateway::{Error, Route};
use serde::{Deserialize, Serialize};
use serde_json::json;


use crate::context::Context;
use crate::session::CookieSession;

/// Response header listing the paths whose views are stale after an action
pub const REVALIDATE: &str = "x-revalidate";

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    /// Shows only notes of this category
    category: Option<CategoryId>,
}

/// Notes dashboard
#[get("/")]
async fn dashboard(
    req: HttpRequest,
    context: Data<Context>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let mut session = context.session(&req);
    let page = pages::dashboard(&mut session, context.api(), query.category).await;
    render(&session, page)
}

/// Note editor
#[get("/notes/{id}")]
async fn note(
    req: HttpRequest,
    context: Data<Context>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let mut session = context.session(&req);
    let page = pages::note(&mut session, context.api(), &id).await;
    render(&session, page)
}

#[post("/notes")]
async fn create_note(req: HttpRequest, context: Data<Context>) -> Result<HttpResponse> {
    let mut session = context.session(&req);
    let effect = actions::create_note(&mut session, context.api())
        .await
        .map_err(ErrorBadGateway)?;
    Ok(respond(&session, effect))
}

#[patch("/notes/{id}")]
async fn update_note(
    req: HttpRequest,
    context: Data<Context>,
    id: web::Path<NoteId>,
    patch: web::Json<NotePatch>,
) -> HttpResponse {
    let mut session = context.session(&req);
    let effect = actions::update_note(&mut session, context.api(), *id, &patch).await;
    respond(&session, effect)
}

#[delete("/notes/{id}")]
async fn delete_note(
    req: HttpRequest,
    context: Data<Context>,
    id: web::Path<NoteId>,
) -> HttpResponse {
    let mut session = context.session(&req);
    let effect = actions::delete_note(&mut session, context.api(), *id).await;
    respond(&session, effect)
}

#[post("/login")]
async fn login(
    req: HttpRequest,
    context: Data<Context>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let mut session = context.session(&req);
    let effect = actions::login(&mut session, context.api(), &credentials(&form)).await;
    respond(&session, effect)
}

#[post("/signup")]
async fn signup(
    req: HttpRequest,
    context: Data<Context>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let mut session = context.session(&req);
    let effect = actions::register(&mut session, context.api(), &credentials(&form)).await;
    respond(&session, effect)
}

#[post("/logout")]
async fn logout(req: HttpRequest, context: Data<Context>) -> HttpResponse {
    let mut session = context.session(&req);
    let effect = actions::logout(&mut session);
    respond(&session, effect)
}

/// Value of the form field `key`
///
/// Forms may prefix their field names, so when there is no non-empty `key` field, the first field
/// named `*_key` is used.
fn form_field<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
    let direct = form
        .iter()
        .find(|(name, value)| name == key && !value.is_empty());

    let suffix = format!("_{key}");
    direct
        .or_else(|| form.iter().find(|(name, _)| name.ends_with(&suffix)))
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

fn credentials(form: &[(String, String)]) -> Credentials {
    Credentials::new(form_field(form, "email"), form_field(form, "password"))
}

/// Turns the page outcome into the response
fn render<T: Serialize>(
    session: &CookieSession,
    page: Result<Page<T>, Error>,
) -> Result<HttpResponse> {
    let response = match page.map_err(ErrorBadGateway)? {
        Page::Render(view) => {
            let mut response = HttpResponse::Ok();
            session.apply(&mut response);
            response.json(view)
        }
        Page::NotFound => {
            let mut response = HttpResponse::NotFound();
            session.apply(&mut response);
            response.json(json!({ "detail": "Not found." }))
        }
        Page::Redirect(route) => redirect(session, route),
    };

    Ok(response)
}

/// Answers the form with the action effect
///
/// Paths of the stale views are listed in the [`REVALIDATE`] header, so the client refetches them
/// on the next navigation.
fn respond(session: &CookieSession, effect: Effect) -> HttpResponse {
    let mut response = match &effect.action {
        Action::Redirect(route) => see_other(*route),
        Action::Inline(_) => HttpResponse::Ok(),
    };

    if !effect.revalidate.is_empty() {
        let paths: Vec<_> = effect.revalidate.iter().map(Route::path).collect();
        response.insert_header((REVALIDATE, paths.join(", ")));
    }
    session.apply(&mut response);

    match effect.action {
        Action::Redirect(_) => response.finish(),
        Action::Inline(result) => response.json(result),
    }
}

fn see_other(route: Route) -> HttpResponseBuilder {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, route.path()));
    response
}

fn redirect(session: &CookieSession, route: Route) -> HttpResponse {
    let mut response = see_other(route);
    session.apply(&mut response);
    response.finish()
}

/// Returns configuration function for the ActixWeb services
pub fn configure(context: Context) -> impl Fn(&mut ServiceConfig) + Clone {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(Data::new(context.clone()))
            .service(dashboard)
            .service(note)
            .service(create_note)
            .service(update_note)
            .service(delete_note)
            .service(login)
            .service(signup)
            .service(logout);
    }
}
