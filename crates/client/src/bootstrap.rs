//! The three-stage session bootstrap handshake.
//!
//! 1. `POST /v1/login` with the account credentials → `swicus` cookie.
//! 2. `GET /common/login` (following redirects) → `swi-settings` cookie.
//! 3. `GET /settings` with both cookies → CSRF token from the page head.
//!
//! Stages run strictly in order and the first failure aborts the rest,
//! wrapped as [`Error::Bootstrap`] with the failing [`Stage`].

use std::time::Instant;

use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::StatusCode;
use scraper::Html;
use serde::{Deserialize, Serialize};
use swi_domain::error::{Error, Result, Stage};
use swi_domain::trace::TraceEvent;
use url::Url;
use uuid::Uuid;

use crate::client::{endpoint_url, from_reqwest, Credentials, Session};
use crate::cookies::{self, cookie_header, SWICUS, SWI_SETTINGS};
use crate::html;

pub const LOGIN_ENDPOINT: &str = "/v1/login";
pub const LOGIN_PAGE: &str = "/common/login";
pub const SETTINGS_PAGE: &str = "/settings";

/// Upper bound on redirects followed while fetching the login page.
pub const MAX_REDIRECTS: usize = 10;

const STATE_LEN: usize = 10;

// ── fixed authorization parameters ──────────────────────────────────

const RESPONSE_TYPE: &str = "code";
const SCOPE: &str = "openid swicus";
const CLIENT_ID: &str = "adminpanel";
const REDIRECT_URI: &str = "https://my.solarwinds.cloud/common/auth/callback";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
    login_query_params: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    #[serde(default)]
    redirect_url: String,
}

/// Output of the login stage; consumed by the CSRF token stage.
#[derive(Clone)]
pub struct LoginResult {
    /// Identity-session cookie taken from `Set-Cookie`.
    pub swicus: String,
    pub redirect_url: String,
}

impl std::fmt::Debug for LoginResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResult")
            .field("swicus", &"<redacted>")
            .field("redirect_url", &without_query(&self.redirect_url))
            .finish()
    }
}

/// Runs the handshake against one base URL with borrowed HTTP handles.
///
/// `login_page_http` must not follow redirects: stage 2 walks the hop
/// chain itself so cookies set on intermediate hops stay visible.
pub struct Bootstrapper<'a> {
    http: &'a HttpClient,
    login_page_http: &'a HttpClient,
    base_url: &'a str,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(http: &'a HttpClient, login_page_http: &'a HttpClient, base_url: &'a str) -> Self {
        Self {
            http,
            login_page_http,
            base_url,
        }
    }

    /// Run all three stages and return the populated session.
    pub fn run(&self, credentials: &Credentials) -> Result<Session> {
        let start = Instant::now();
        let span = tracing::info_span!("bootstrap", base_url = %self.base_url);
        let _guard = span.enter();

        let login = self
            .login(credentials)
            .map_err(|e| e.at_stage(Stage::Login))?;
        let settings_cookie = self
            .obtain_settings_cookie()
            .map_err(|e| e.at_stage(Stage::SettingsCookie))?;
        let csrf_token = self
            .obtain_csrf_token(&login, &settings_cookie)
            .map_err(|e| e.at_stage(Stage::CsrfToken))?;

        TraceEvent::BootstrapCompleted {
            base_url: self.base_url.to_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(Session::new(settings_cookie, csrf_token))
    }

    // ── stage 1 ──────────────────────────────────────────────────────

    /// Credential login. Requires HTTP 200 and a `swicus` cookie.
    pub fn login(&self, credentials: &Credentials) -> Result<LoginResult> {
        let start = Instant::now();
        let payload = LoginPayload {
            email: credentials.email(),
            password: credentials.password(),
            login_query_params: login_query_params(&random_state()),
        };
        let body = serde_json::to_vec(&payload)?;

        tracing::debug!(email = %credentials.email(), "posting credential login");
        let resp = self
            .http
            .post(self.url(LOGIN_ENDPOINT)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(from_reqwest)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Status {
                endpoint: format!("POST {LOGIN_ENDPOINT}"),
                status: status.as_u16(),
            });
        }

        let swicus = cookies::extract_cookie(resp.headers(), SWICUS);
        let text = resp.text().map_err(from_reqwest)?;
        let login_body: LoginBody = serde_json::from_str(&text)?;
        let swicus = swicus?;

        TraceEvent::LoginCompleted {
            status: status.as_u16(),
            redirect_to: without_query(&login_body.redirect_url),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(LoginResult {
            swicus,
            redirect_url: login_body.redirect_url,
        })
    }

    // ── stage 2 ──────────────────────────────────────────────────────

    /// Fetch the login page without credentials and pick the
    /// `swi-settings` cookie out of the redirect chain.
    ///
    /// The final response is checked first, then earlier hops newest
    /// first; the platform may set the cookie on the last redirect.
    pub fn obtain_settings_cookie(&self) -> Result<String> {
        let start = Instant::now();
        let mut url = self.url(LOGIN_PAGE)?;
        let mut chain = Vec::new();

        loop {
            let resp = self
                .login_page_http
                .get(url.clone())
                .send()
                .map_err(from_reqwest)?;
            let next = redirect_target(&resp)?;
            tracing::debug!(url = %resp.url(), status = resp.status().as_u16(), "login page hop");
            chain.push(resp.headers().clone());

            match next {
                Some(target) if chain.len() > MAX_REDIRECTS => {
                    return Err(Error::Http(format!(
                        "GET {LOGIN_PAGE}: more than {MAX_REDIRECTS} redirects (last target {target})"
                    )));
                }
                Some(target) => url = target,
                None => break,
            }
        }

        let cookie = chain
            .iter()
            .rev()
            .find_map(|headers| cookies::extract_cookie(headers, SWI_SETTINGS).ok())
            .ok_or_else(|| Error::CookieMissing(SWI_SETTINGS.to_owned()))?;

        TraceEvent::SettingsCookieObtained {
            redirects: chain.len() - 1,
            cookie_chars: cookie.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(cookie)
    }

    // ── stage 3 ──────────────────────────────────────────────────────

    /// Fetch the settings page with both cookies and extract the token.
    pub fn obtain_csrf_token(&self, login: &LoginResult, settings_cookie: &str) -> Result<String> {
        let start = Instant::now();
        let resp = self
            .http
            .get(self.url(SETTINGS_PAGE)?)
            .header(
                COOKIE,
                cookie_header(&[(SWICUS, login.swicus.as_str()), (SWI_SETTINGS, settings_cookie)]),
            )
            .send()
            .map_err(from_reqwest)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Status {
                endpoint: format!("GET {SETTINGS_PAGE}"),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(from_reqwest)?;
        let token = html::extract_csrf_token(&Html::parse_document(&body))?;

        TraceEvent::CsrfTokenObtained {
            status: status.as_u16(),
            token_chars: token.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(token)
    }

    fn url(&self, path: &str) -> Result<Url> {
        endpoint_url(self.base_url, path)
    }
}

/// Resolve the `Location` of a redirect response against its URL.
fn redirect_target(resp: &Response) -> Result<Option<Url>> {
    if !resp.status().is_redirection() {
        return Ok(None);
    }
    let Some(location) = resp.headers().get(LOCATION) else {
        return Ok(None);
    };
    let location = location
        .to_str()
        .map_err(|e| Error::Http(format!("invalid Location header: {e}")))?;
    Ok(Some(resp.url().join(location)?))
}

/// Scheme, host and path of `raw`; the query may carry an authorization code.
fn without_query(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => format!("<{} chars>", raw.len()),
    }
}

/// Form-encode the authorization parameters in key order.
pub fn login_query_params(state: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", CLIENT_ID)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", RESPONSE_TYPE)
        .append_pair("scope", SCOPE)
        .append_pair("state", state)
        .finish()
}

/// A fresh anti-replay nonce of [`STATE_LEN`] alphanumeric characters.
pub fn random_state() -> String {
    let mut state = Uuid::new_v4().simple().to_string();
    state.truncate(STATE_LEN);
    state
}
