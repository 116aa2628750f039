use serde::Serialize;

/// Structured trace events emitted by the client crates.
///
/// Events never carry secrets: cookie and token values are reported by
/// length only, and URLs lose their query strings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    LoginCompleted {
        status: u16,
        /// Redirect URL without its query string.
        redirect_to: String,
        duration_ms: u64,
    },
    SettingsCookieObtained {
        redirects: usize,
        cookie_chars: usize,
        duration_ms: u64,
    },
    CsrfTokenObtained {
        status: u16,
        token_chars: usize,
        duration_ms: u64,
    },
    BootstrapCompleted {
        base_url: String,
        duration_ms: u64,
    },
    QueryExecuted {
        operation: String,
        status: u16,
        success: bool,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "swi_event");
    }
}
