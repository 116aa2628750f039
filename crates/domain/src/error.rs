use std::fmt;

/// The three ordered stages of the session bootstrap handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `POST /v1/login` — credential login, yields the identity cookie.
    Login,
    /// `GET /common/login` — yields the settings cookie.
    SettingsCookie,
    /// `GET /settings` — yields the anti-forgery token.
    CsrfToken,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Login => "login",
            Stage::SettingsCookie => "settings cookie",
            Stage::CsrfToken => "csrf token",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, undecodable body or unexpected HTTP status.
    Transport,
    /// A successful response that is missing a cookie or token the
    /// platform is expected to deliver.
    Protocol,
    /// The result envelope reported `success: false`.
    Application,
    /// Misconfiguration or misuse of the client.
    Usage,
}

/// Error type shared by the SolarWinds client crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("cookie `{0}` not present in response")]
    CookieMissing(String),

    #[error("response does not contain a CSRF token")]
    TokenMissing,

    #[error("request failed with message: {0}")]
    Application(String),

    #[error("bootstrap failed at {stage} stage: {source}")]
    Bootstrap {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("client is not initialized; call init() first")]
    NotInitialized,

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Wrap `self` as a failure of the given bootstrap stage.
    pub fn at_stage(self, stage: Stage) -> Self {
        Error::Bootstrap {
            stage,
            source: Box::new(self),
        }
    }

    /// Classify the error. A bootstrap failure reports the kind of its cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_)
            | Error::Timeout(_)
            | Error::Json(_)
            | Error::Url(_)
            | Error::Status { .. } => ErrorKind::Transport,
            Error::CookieMissing(_) | Error::TokenMissing => ErrorKind::Protocol,
            Error::Application(_) => ErrorKind::Application,
            Error::NotInitialized | Error::Config(_) => ErrorKind::Usage,
            Error::Bootstrap { source, .. } => source.kind(),
        }
    }

    /// The bootstrap stage that failed, if this is a bootstrap error.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Bootstrap { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
