//! Service global context

use std::sync::Arc;

use actix_web::HttpRequest;
use notes_gateway::ApiClient;

use crate::config;
use crate::session::CookieSession;

struct ContextInner {
    /// Notes API access
    api: ApiClient,
    /// Session cookies attributes
    cookies: config::Cookies,
}

#[derive(Clone)]
pub struct Context(Arc<ContextInner>);

impl Context {
    pub fn new(api: ApiClient, cookies: config::Cookies) -> Self {
        Self(Arc::new(ContextInner {
            api,
            cookies,
        }))
    }

    /// Context from configuration
    pub fn with_config(api: &config::Api, cookies: config::Cookies) -> color_eyre::Result<Self> {
        let api = ApiClient::new(&api.base_url)?;
        Ok(Self::new(api, cookies))
    }

    pub fn api(&self) -> &ApiClient {
        &self.0.api
    }

    /// Session of the request
    pub fn session(&self, req: &HttpRequest) -> CookieSession {
        CookieSession::from_request(req, self.0.cookies.secure)
    }
}
