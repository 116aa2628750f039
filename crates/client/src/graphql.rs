//! Query/mutation envelopes exchanged with `/common/graphql`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use swi_domain::error::{Error, Result};

/// Path of the platform's single query endpoint.
pub const GRAPHQL_ENDPOINT: &str = "/common/graphql";

/// Outbound query envelope.
///
/// Encoded with `serde_json`, which leaves `<`, `>` and `&` unescaped, so
/// markup inside documents or variables reaches the server verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<V = serde_json::Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    pub query: String,
    pub variables: V,
}

impl QueryRequest<serde_json::Value> {
    /// A query with an empty variables object.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            operation_name: None,
            query: query.into(),
            variables: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl<V> QueryRequest<V> {
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Replace the variables with a typed value.
    pub fn variables<W>(self, variables: W) -> QueryRequest<W> {
        QueryRequest {
            operation_name: self.operation_name,
            query: self.query,
            variables,
        }
    }

    /// Label used in logs: the operation name, or `anonymous`.
    pub fn label(&self) -> &str {
        self.operation_name.as_deref().unwrap_or("anonymous")
    }
}

/// Inbound result envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T: DeserializeOwned> ResultEnvelope<T> {
    /// Collapse the envelope into the payload or an application error.
    ///
    /// A successful envelope without `data` yields the payload type
    /// decoded from `null`, so `()` and `Option<_>` payloads work while
    /// structured payloads fail with a decode error.
    pub fn into_result(self) -> Result<T> {
        if !self.success {
            return Err(Error::Application(
                self.message
                    .unwrap_or_else(|| "no message in failure envelope".into()),
            ));
        }
        match self.data {
            Some(data) => Ok(data),
            None => Ok(serde_json::from_value(serde_json::Value::Null)?),
        }
    }
}
