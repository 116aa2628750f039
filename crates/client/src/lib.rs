//! `swi-client` — blocking session client for the SolarWinds admin panel.
//!
//! A [`Client`] authenticates with a three-stage handshake (credential
//! login, settings cookie, CSRF token scraped from the settings page) and
//! then sends query envelopes to `/common/graphql`, attaching the
//! `swi-settings` cookie and `X-CSRF-Token` header to every call.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use swi_client::{Client, QueryRequest};
//! use swi_domain::config::ClientConfig;
//!
//! # fn example() -> swi_domain::error::Result<()> {
//! let cfg = ClientConfig::new("ops@example.com", "secret");
//! let mut client = Client::new(&cfg)?;
//! client.init()?;
//!
//! let users: serde_json::Value = client.execute(
//!     &QueryRequest::new("query Users { users { email } }").operation_name("Users"),
//! )?;
//! println!("{users}");
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every failure is a [`swi_domain::error::Error`]; use
//! [`Error::kind`](swi_domain::error::Error::kind) to tell transport
//! problems from platform contract violations and application-level
//! failures. Bootstrap failures carry the [`Stage`] that broke.

pub mod bootstrap;
pub mod client;
pub mod cookies;
pub mod graphql;
pub mod html;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use bootstrap::{Bootstrapper, LoginResult};
pub use client::{from_reqwest, Client, ClientBuilder, Credentials, Session, HEADER_CSRF_TOKEN};
pub use graphql::{QueryRequest, ResultEnvelope, GRAPHQL_ENDPOINT};
pub use swi_domain::error::{Error, ErrorKind, Result, Stage};
