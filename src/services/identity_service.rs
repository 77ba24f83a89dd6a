use std::time::Duration;

use reqwest::{header::ACCEPT, Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::models::user::Identity;

/// Resolves bearer tokens against the identity service's `/me` endpoint.
#[derive(Clone)]
pub struct IdentityService {
    client: Client,
    base_url: String,
}

/// `/me` answers either `{success, data: {...}}` or the bare identity object.
fn identity_from_body(body: JsonValue) -> Option<Identity> {
    if body.get("success").and_then(JsonValue::as_bool) == Some(false) {
        return None;
    }
    let data = match body.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => body,
    };
    if !data.is_object() {
        return None;
    }
    serde_json::from_value(data).ok()
}

impl IdentityService {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `None` for anything but a 200 carrying an identity. Transport failures
    /// count as unauthenticated.
    #[instrument(skip(self, token))]
    pub async fn introspect(&self, token: &str) -> Option<Identity> {
        let url = format!("{}/me", self.base_url);
        let response = match self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Identity service unreachable");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "Identity service rejected token");
            return None;
        }

        match response.json::<JsonValue>().await {
            Ok(body) => identity_from_body(body),
            Err(e) => {
                warn!(error = %e, "Identity service returned unreadable body");
                None
            }
        }
    }
}
