//! The session-holding [`Client`]: construction, bootstrap, the request
//! builder and the query transport.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{redirect, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use swi_domain::config::ClientConfig;
use swi_domain::error::{Error, Result};
use swi_domain::trace::TraceEvent;
use url::Url;

use crate::bootstrap::{Bootstrapper, MAX_REDIRECTS};
use crate::cookies::{cookie_header, SWI_SETTINGS};
use crate::graphql::{QueryRequest, ResultEnvelope, GRAPHQL_ENDPOINT};

/// Anti-forgery header attached to every authenticated request.
pub const HEADER_CSRF_TOKEN: &str = "X-CSRF-Token";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credentials & session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Account email and password. Immutable once the client is built.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Artifacts produced by a successful bootstrap.
///
/// Only constructed once all three stages succeed and never mutated
/// afterwards, so a partially initialised session cannot be observed.
#[derive(Clone)]
pub struct Session {
    settings_cookie: String,
    csrf_token: String,
}

impl Session {
    pub(crate) fn new(settings_cookie: String, csrf_token: String) -> Self {
        Self {
            settings_cookie,
            csrf_token,
        }
    }

    /// Value of the `swi-settings` cookie.
    pub fn settings_cookie(&self) -> &str {
        &self.settings_cookie
    }

    /// Value sent in the `X-CSRF-Token` header.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("settings_cookie", &format_args!("<{} chars>", self.settings_cookie.len()))
            .field("csrf_token", &format_args!("<{} chars>", self.csrf_token.len()))
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A blocking client for the SolarWinds admin panel.
///
/// Created once per logical login: build it, call [`Client::init`] once,
/// then issue any number of [`Client::execute`] calls. `execute` borrows
/// the client immutably, so a bootstrapped client can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    /// Never follows redirects; used for the login page hop chain.
    login_page_http: HttpClient,
    base_url: String,
    credentials: Credentials,
    session: Option<Session>,
}

impl Client {
    /// Build a client from the shared `ClientConfig`.
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(cfg)?.build()
    }

    pub fn builder(email: impl Into<String>, password: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(Credentials::new(email, password))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    /// The session, once [`Client::init`] has succeeded.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Run the three-stage bootstrap and attach the resulting session.
    ///
    /// On failure the client keeps whatever session it had before (none,
    /// for a fresh client) and the error names the failing stage.
    pub fn init(&mut self) -> Result<()> {
        let session = Bootstrapper::new(&self.http, &self.login_page_http, &self.base_url)
            .run(&self.credentials)?;
        tracing::info!(email = %self.credentials.email(), "session bootstrapped");
        self.session = Some(session);
        Ok(())
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Build an authenticated request for a path like `/common/graphql`.
    ///
    /// Attaches the JSON content type, the `swi-settings` cookie and the
    /// `X-CSRF-Token` header. The identity cookie is never sent here.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session.as_ref().ok_or(Error::NotInitialized)?;
        let url = endpoint_url(&self.base_url, path)?;
        Ok(self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, cookie_header(&[(SWI_SETTINGS, session.settings_cookie())]))
            .header(HEADER_CSRF_TOKEN, session.csrf_token()))
    }

    /// Send a query envelope and return its typed payload.
    ///
    /// * Network and body-read failures → `Error::Http` / `Error::Timeout`.
    /// * Undecodable body → `Error::Json` (or `Error::Status` on non-2xx).
    /// * `success: false` → `Error::Application` with the envelope message.
    pub fn execute<V, T>(&self, query: &QueryRequest<V>) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(query)?;
        let start = Instant::now();
        let resp = self
            .request(Method::POST, GRAPHQL_ENDPOINT)?
            .body(body)
            .send()
            .map_err(from_reqwest)?;

        let status = resp.status();
        let text = resp.text().map_err(from_reqwest)?;
        let status_error = || Error::Status {
            endpoint: format!("POST {GRAPHQL_ENDPOINT}"),
            status: status.as_u16(),
        };

        let envelope: ResultEnvelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(status_error()),
            Err(e) => {
                tracing::warn!(operation = query.label(), error = %e, "undecodable result envelope");
                return Err(Error::Json(e));
            }
        };

        TraceEvent::QueryExecuted {
            operation: query.label().to_owned(),
            status: status.as_u16(),
            success: envelope.success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        if envelope.success && !status.is_success() {
            return Err(status_error());
        }
        envelope.into_result()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Builder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Programmatic construction of a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    credentials: Credentials,
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    http: Option<HttpClient>,
}

impl ClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: None,
            timeout: Duration::from_millis(30_000),
            user_agent: None,
            http: None,
        }
    }

    /// Builder seeded from config; resolves the password from the
    /// environment when the config does not carry one.
    pub fn from_config(cfg: &ClientConfig) -> Result<Self> {
        let credentials = Credentials::new(cfg.email.clone(), cfg.resolve_password()?);
        let mut builder = Self::new(credentials)
            .base_url(cfg.base_url.clone())
            .timeout(Duration::from_millis(cfg.timeout_ms));
        builder.user_agent = cfg.user_agent.clone();
        Ok(builder)
    }

    /// Override the production host. An empty string keeps the default.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = (!base_url.is_empty()).then_some(base_url);
        self
    }

    /// Per-request deadline for the built-in HTTP handles.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Share an existing HTTP handle for the login, settings page and
    /// query requests. Its redirect policy is honoured there; the login
    /// page is still fetched through a dedicated handle that never
    /// follows redirects, built from the timeout and user agent settings.
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client> {
        let raw = self
            .base_url
            .as_deref()
            .unwrap_or(swi_domain::config::DEFAULT_BASE_URL);
        let parsed = Url::parse(raw)?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Config(format!("{raw} cannot be used as a base URL")));
        }
        let base_url = raw.trim_end_matches('/').to_owned();

        let http = match self.http {
            Some(ref http) => http.clone(),
            None => self.http_handle(redirect::Policy::limited(MAX_REDIRECTS))?,
        };
        // The login page hop chain is walked by hand.
        let login_page_http = self.http_handle(redirect::Policy::none())?;

        Ok(Client {
            http,
            login_page_http,
            base_url,
            credentials: self.credentials,
            session: None,
        })
    }

    fn http_handle(&self, policy: redirect::Policy) -> Result<HttpClient> {
        let mut builder = HttpClient::builder().timeout(self.timeout).redirect(policy);
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        builder.build().map_err(from_reqwest)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Append `path` to the base URL (which carries no trailing slash).
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{base_url}{path}"))?)
}

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
