//! Shared fixtures: a recording fake of the HTTP collaborator and a
//! pre-wired context pointing at a fictional org.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use sfcms::auth::SessionManager;
use sfcms::clock::ManualClock;
use sfcms::config::{ServiceIdentity, LOGIN_URL_PRODUCTION};
use sfcms::context::CmsContext;
use sfcms::error::{CmsError, Result};
use sfcms::http::{HttpRequest, HttpResponse, HttpTransport, Method};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const INSTANCE_URL: &str = "https://acme.my.salesforce.com";
pub const API_BASE: &str = "https://acme.my.salesforce.com/services/data/v60.0";
pub const WORKSPACE_ID: &str = "0Zu5e000000ABCDCA4";
pub const CHANNEL_ID: &str = "0ap5e000000WXYZAA0";
pub const ACCESS_TOKEN: &str = "00D5e000000TEST!AQ0AQfake";

pub const WORKSPACE_QUERY: &str = "FROM%20ManagedContentSpace%20";
pub const CHANNEL_QUERY: &str = "FROM%20ManagedContentChannel%20";
pub const TOKEN_PATH: &str = "/services/oauth2/token";

struct Route {
    method: Method,
    fragment: String,
    response: Result<HttpResponse>,
}

/// Answers requests from registered routes and records every request.
///
/// Routes match on method plus a URL substring; the most recently
/// registered match wins.
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn route(&self, method: Method, fragment: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            response: Ok(HttpResponse::new(status, body)),
        });
    }

    pub fn fail(&self, method: Method, fragment: &str, message: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            response: Err(CmsError::Http(message.to_string())),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url.contains(fragment))
            .count()
    }

    pub fn last(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let routes = self.routes.lock().unwrap();
        let route = routes
            .iter()
            .rev()
            .find(|r| r.method == request.method && request.url.contains(&r.fragment));
        match route {
            Some(Route {
                response: Ok(response),
                ..
            }) => Ok(response.clone()),
            Some(Route {
                response: Err(e), ..
            }) => Err(CmsError::Http(e.to_string())),
            None => Err(CmsError::Http(format!(
                "no route for {} {}",
                request.method, request.url
            ))),
        }
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn identity() -> ServiceIdentity {
    ServiceIdentity {
        client_id: "3MVG9test.consumer.key".to_string(),
        username: "integration@acme.example".to_string(),
        private_key_path: fixture("test_key.pem"),
        workspace_name: "Marketing".to_string(),
        api_version: "60.0".to_string(),
        audience: LOGIN_URL_PRODUCTION.to_string(),
        login_url: LOGIN_URL_PRODUCTION.to_string(),
    }
}

pub fn token_body() -> String {
    format!(
        r#"{{"access_token":"{}","instance_url":"{}","token_type":"Bearer","issued_at":"1760000000000"}}"#,
        ACCESS_TOKEN, INSTANCE_URL
    )
}

/// Token exchange plus workspace and channel resolution succeed
pub fn standard_org(fake: &FakeTransport) {
    fake.route(Method::Post, TOKEN_PATH, 200, &token_body());
    fake.route(
        Method::Get,
        WORKSPACE_QUERY,
        200,
        &format!(
            r#"{{"totalSize":1,"done":true,"records":[{{"attributes":{{"type":"ManagedContentSpace"}},"Id":"{}","Name":"Marketing"}}]}}"#,
            WORKSPACE_ID
        ),
    );
    fake.route(
        Method::Get,
        CHANNEL_QUERY,
        200,
        &format!(
            r#"{{"totalSize":1,"done":true,"records":[{{"Id":"{}","Name":"Marketing Delivery"}}]}}"#,
            CHANNEL_ID
        ),
    );
}

pub fn clock() -> Arc<ManualClock> {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap())
}

pub fn session(fake: &Arc<FakeTransport>, clock: &Arc<ManualClock>) -> SessionManager {
    SessionManager::new(identity(), fake.clone(), clock.clone())
}

pub fn context(fake: &Arc<FakeTransport>, clock: &Arc<ManualClock>) -> CmsContext {
    CmsContext::new(session(fake, clock), clock.clone())
}
