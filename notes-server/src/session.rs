//! Cookie-backed session

use actix_web::HttpRequest;
use actix_web::HttpResponseBuilder;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, CookieJar, SameSite};
use notes_gateway::session::{ACCESS_COOKIE, REFRESH_COOKIE, SESSION_MAX_AGE_SECS};
use notes_gateway::{AccessToken, SessionStore, TokenPair};

/// Session stored in the request cookies
///
/// The jar is seeded with the session cookies of the incoming request. Changes are collected and
/// written to the response with [`CookieSession::apply`].
#[derive(Debug)]
pub struct CookieSession {
    jar: CookieJar,
    secure: bool,
}

impl CookieSession {
    pub fn from_request(req: &HttpRequest, secure: bool) -> Self {
        let mut jar = CookieJar::new();
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            if let Some(cookie) = req.cookie(name) {
                jar.add_original(cookie);
            }
        }

        Self { jar, secure }
    }

    /// Writes the changed cookies to the response
    pub fn apply(&self, response: &mut HttpResponseBuilder) {
        for cookie in self.jar.delta() {
            response.cookie(cookie.clone());
        }
    }

    fn cookie(&self, name: &'static str, value: &str) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value.to_owned());
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(Duration::seconds(SESSION_MAX_AGE_SECS));
        cookie
    }
}

impl SessionStore for CookieSession {
    fn read(&self) -> Option<AccessToken> {
        self.jar
            .get(ACCESS_COOKIE)
            .map(|cookie| AccessToken::new(cookie.value()))
    }

    fn establish(&mut self, tokens: TokenPair) {
        let access = self.cookie(ACCESS_COOKIE, tokens.access.as_str());
        let refresh = self.cookie(REFRESH_COOKIE, tokens.refresh.as_str());
        self.jar.add(access);
        self.jar.add(refresh);
    }

    fn clear(&mut self) {
        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let mut cookie = Cookie::named(name);
            cookie.set_path("/");
            self.jar.remove(cookie);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn request(cookies: &[(&'static str, &'static str)]) -> HttpRequest {
        cookies
            .iter()
            .fold(TestRequest::default(), |req, (name, value)| {
                req.cookie(Cookie::new(*name, *value))
            })
            .to_http_request()
    }

    #[test]
    fn reads_access_cookie() {
        let session = CookieSession::from_request(&request(&[(ACCESS_COOKIE, "token")]), false);
        assert_eq!(session.read(), Some(AccessToken::new("token")));

        let session = CookieSession::from_request(&request(&[(REFRESH_COOKIE, "token")]), false);
        assert_eq!(session.read(), None);
    }

    #[test]
    fn established_cookies_attributes() {
        let mut session = CookieSession::from_request(&request(&[]), true);
        session.establish(TokenPair::new("access", "refresh"));

        assert_eq!(session.read(), Some(AccessToken::new("access")));

        let mut delta: Vec<_> = session.jar.delta().cloned().collect();
        delta.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(delta.len(), 2);
        assert_eq!(delta[0].name(), ACCESS_COOKIE);
        assert_eq!(delta[0].value(), "access");
        assert_eq!(delta[1].name(), REFRESH_COOKIE);
        assert_eq!(delta[1].value(), "refresh");

        for cookie in delta {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
        }
    }

    #[test]
    fn clear_emits_removal_cookies() {
        let req = request(&[(ACCESS_COOKIE, "token"), (REFRESH_COOKIE, "refresh")]);
        let mut session = CookieSession::from_request(&req, false);

        session.clear();
        assert_eq!(session.read(), None);

        let delta: Vec<_> = session.jar.delta().collect();
        assert_eq!(delta.len(), 2);
        for cookie in delta {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }

    #[test]
    fn clearing_absent_session() {
        let mut session = CookieSession::from_request(&request(&[]), false);

        session.clear();

        assert_eq!(session.read(), None);
        assert_eq!(session.jar.delta().count(), 0);
    }

    #[test]
    fn unchanged_session_writes_nothing() {
        let session = CookieSession::from_request(&request(&[(ACCESS_COOKIE, "token")]), false);

        assert_eq!(session.read(), Some(AccessToken::new("token")));
        assert_eq!(session.jar.delta().count(), 0);
    }
}
