//! In-process mock of the admin panel for the blocking client.
//!
//! `wiremock` is async; the server lives on a private tokio runtime while
//! the blocking client runs on the test thread.

#![allow(dead_code)]

use serde_json::json;
use swi_client::Client;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "T0k3n-from-meta";
pub const SETTINGS: &str = "settings-cookie-value";
pub const SWICUS: &str = "identity-cookie-value";

pub fn settings_page(token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Settings</title>
    <meta name="csrf-token" content="{token}">
  </head>
  <body><div id="app"></div></body>
</html>"#
    )
}

// Field order matters: the server must drop before its runtime.
pub struct MockPlatform {
    server: MockServer,
    rt: Runtime,
}

impl MockPlatform {
    pub fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn received(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    /// Number of received requests whose path equals `p`.
    pub fn hits(&self, p: &str) -> usize {
        self.received().iter().filter(|r| r.url.path() == p).count()
    }

    pub fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }

    pub fn client(&self) -> Client {
        Client::builder("ops@example.com", "s3cret<&>")
            .base_url(self.uri())
            .build()
            .unwrap()
    }

    /// Like [`MockPlatform::client`] but sharing a caller-supplied handle.
    pub fn client_with_http(&self, http: reqwest::blocking::Client) -> Client {
        Client::builder("ops@example.com", "s3cret<&>")
            .base_url(self.uri())
            .http_client(http)
            .build()
            .unwrap()
    }

    // ── happy-path stages ────────────────────────────────────────────

    pub fn mount_login_ok(&self) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/v1/login"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .append_header("set-cookie", format!("swicus={SWICUS}; Path=/; HttpOnly"))
                        .set_body_json(json!({
                            "swicus": "echoed-body-value",
                            "redirectUrl": "https://my.solarwinds.cloud/common/auth/callback?code=x"
                        })),
                ),
        );
    }

    pub fn mount_settings_cookie_ok(&self) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/common/login"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .append_header("set-cookie", format!("swi-settings={SETTINGS}; Path=/"))
                        .set_body_string("<html></html>"),
                ),
        );
    }

    pub fn mount_settings_page(&self, body: String) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/settings"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body)),
        );
    }

    pub fn mount_all_stages(&self) {
        self.mount_login_ok();
        self.mount_settings_cookie_ok();
        self.mount_settings_page(settings_page(TOKEN));
    }

    /// A client that has completed the handshake against this mock.
    pub fn bootstrapped_client(&self) -> Client {
        self.mount_all_stages();
        let mut client = self.client();
        client.init().unwrap();
        client
    }
}

pub fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}
