//! Mock Notes API for flow tests
//!
//! Serves canned responses on an ephemeral local port and records every request it receives.
//! Requests without a canned response get `404 {"detail": "Not found."}`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use warp::Filter;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;

use crate::ApiClient;

/// Request as received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Raw `Authorization` header
    pub authorization: Option<String>,
    /// JSON body, `None` if empty or not JSON
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    responses: HashMap<(String, String), (u16, Value)>,
    requests: Vec<Recorded>,
}

pub struct MockApi {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl MockApi {
    /// Starts the mock on the current tokio runtime
    pub fn start() -> Self {
        let state = Arc::new(Mutex::new(State::default()));

        let handler_state = Arc::clone(&state);
        let routes = warp::method()
            .and(warp::path::full())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::bytes())
            .map(
                move |method: Method,
                      path: warp::path::FullPath,
                      query: HashMap<String, String>,
                      authorization: Option<String>,
                      body: Bytes| {
                    let mut state = handler_state.lock().unwrap();
                    state.requests.push(Recorded {
                        method: method.as_str().to_owned(),
                        path: path.as_str().to_owned(),
                        query,
                        authorization,
                        body: serde_json::from_slice(&body).ok(),
                    });

                    let (status, body) = state
                        .responses
                        .get(&(method.as_str().to_owned(), path.as_str().to_owned()))
                        .cloned()
                        .unwrap_or_else(|| (404, json!({ "detail": "Not found." })));

                    warp::reply::with_status(
                        warp::reply::json(&body),
                        StatusCode::from_u16(status).unwrap(),
                    )
                },
            );

        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, state }
    }

    /// Registers the response for the method and path
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert((method.to_owned(), path.to_owned()), (status, body));
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client pointed at the mock
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.url()).unwrap()
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }
}

/// Note payload as returned by the API
pub fn note_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "",
        "category": { "id": 1, "name": "Random Thoughts", "color": "#EF9C66" },
        "created_at": "2025-01-10T09:30:00Z",
        "updated_at": "2025-01-11T18:05:00Z",
    })
}

/// Category payload as returned by the API
pub fn category_json(id: i64, name: &str, note_count: u64) -> Value {
    json!({ "id": id, "name": name, "color": "#78ABA8", "note_count": note_count })
}
