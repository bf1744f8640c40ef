//! Pages served by the front server

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use assert_json_diff::{assert_json_eq, assert_json_include};
use notes_gateway::session::{ACCESS_COOKIE, REFRESH_COOKIE};
use notes_gateway::testing::{MockApi, category_json, note_json};
use serde_json::{Value, json};

use crate::service;
use crate::service::tests::{TOKEN, context, cookies, location};

fn dashboard_api() -> MockApi {
    let api = MockApi::start();
    api.respond("GET", "/api/auth/me/", 200, json!({ "email": "a@b.com" }))
        .respond("GET", "/api/notes/", 200, json!([note_json(7, "Groceries")]))
        .respond(
            "GET",
            "/api/categories/",
            200,
            json!([category_json(1, "Random Thoughts", 1)]),
        );
    api
}

#[actix_web::test]
async fn dashboard_requires_session() {
    let api = dashboard_api();
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(api.requests().is_empty());
}

#[actix_web::test]
async fn dashboard_is_fetched_on_every_navigation() {
    let api = dashboard_api();
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let dashboard = |uri: &str| {
        test::TestRequest::get()
            .uri(uri)
            .cookie(Cookie::new(ACCESS_COOKIE, TOKEN))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, dashboard("/")).await;
    assert_json_include!(
        actual: body,
        expected: json!({
            "user": { "email": "a@b.com" },
            "category": null,
            "notes": [{ "id": 7, "title": "Groceries" }],
            "categories": [{ "id": 1, "name": "Random Thoughts", "note_count": 1 }],
        })
    );
    assert_eq!(api.requests().len(), 3);

    let again: Value = test::call_and_read_body_json(&app, dashboard("/?junk=1")).await;
    assert_json_eq!(again, body);
    assert_eq!(api.requests().len(), 6);

    api.respond("GET", "/api/auth/me/", 401, json!({ "detail": "Expired" }));
    let resp = test::call_service(&app, dashboard("/")).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(api.requests().len(), 9);
}

#[actix_web::test]
async fn dashboard_passes_category_filter() {
    let api = dashboard_api();
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let req = test::TestRequest::get()
        .uri("/?category=1")
        .cookie(Cookie::new(ACCESS_COOKIE, TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_json_include!(actual: body, expected: json!({ "category": 1 }));
    let notes = api
        .requests()
        .into_iter()
        .find(|request| request.path == "/api/notes/")
        .unwrap();
    assert_eq!(notes.query.get("category").map(String::as_str), Some("1"));
}

#[actix_web::test]
async fn unknown_notes_are_not_found() {
    let api = MockApi::start();
    api.respond("GET", "/api/categories/", 200, json!([]));
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let req = test::TestRequest::get().uri("/notes/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(api.requests().is_empty());

    let req = test::TestRequest::get()
        .uri("/notes/404")
        .cookie(Cookie::new(ACCESS_COOKIE, TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "detail": "Not found." }));
}

#[actix_web::test]
async fn rejected_session_is_cleared() {
    let api = MockApi::start();
    api.respond("GET", "/api/notes/7/", 401, json!({ "detail": "Expired" }))
        .respond("GET", "/api/categories/", 200, json!([]));
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let req = test::TestRequest::get()
        .uri("/notes/7")
        .cookie(Cookie::new(ACCESS_COOKIE, TOKEN))
        .cookie(Cookie::new(REFRESH_COOKIE, "refresh"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let mut cleared: Vec<_> = cookies(&resp)
        .into_iter()
        .filter(|cookie| cookie.value().is_empty())
        .map(|cookie| cookie.name().to_owned())
        .collect();
    cleared.sort();
    assert_eq!(cleared, [ACCESS_COOKIE, REFRESH_COOKIE]);
}

#[actix_web::test]
async fn failing_api_is_bad_gateway() {
    let api = dashboard_api();
    api.respond("GET", "/api/notes/", 500, json!({ "detail": "Server error" }));
    let app = test::init_service(App::new().configure(service::configure(context(&api)))).await;

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(ACCESS_COOKIE, TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
